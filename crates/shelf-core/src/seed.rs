//! Example books written to an empty library on first run

use chrono::{DateTime, Utc};

use crate::models::{Book, NewBook};

/// The fixed example records, stamped with `now`
pub fn example_books(now: DateTime<Utc>) -> Vec<Book> {
    vec![
        Book::with_id(
            "1",
            NewBook::new("The Passion within", "Harper Lee", 1960)
                .genre("Fiction")
                .description(
                    "A gripping, heart-wrenching, and wholly remarkable tale of coming-of-age \
                     in a South poisoned by virulent prejudice.",
                )
                .isbn("978-0-06-112008-4")
                .cover_image_url(
                    "https://images.pexels.com/photos/256450/pexels-photo-256450.jpeg",
                ),
            now,
        ),
        Book::with_id(
            "2",
            NewBook::new("Graphic Design", "George Orwell", 1949)
                .genre("Dystopian Fiction")
                .description(
                    "A dystopian social science fiction novel that explores themes of \
                     totalitarianism, mass surveillance, and repressive regimentation.",
                )
                .isbn("978-0-452-28423-4")
                .cover_image_url(
                    "https://images.pexels.com/photos/3747266/pexels-photo-3747266.jpeg",
                ),
            now,
        ),
    ]
}
