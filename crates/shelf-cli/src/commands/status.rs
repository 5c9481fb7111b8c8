//! Status command handler

use anyhow::Result;

use shelf_core::{BookStore, Config, FileSlotStore, StorageError};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &BookStore, config: &Config, output: &Output) -> Result<()> {
    let (slot_size, slot_error) = match inspect_slot(config, store.key()) {
        Ok(size) => (size, None),
        Err(e) => {
            output.warning(&format!("Cannot inspect slot file: {}", e));
            (None, Some(e.to_string()))
        }
    };
    let genre_count = store.genres_with_counts().len();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "storage": {
                        "data_dir": config.data_dir,
                        "storage_key": store.key(),
                        "slot_path": config.slot_path(),
                        "slot_exists": slot_size.is_some(),
                        "slot_size": slot_size,
                        "slot_error": slot_error,
                    },
                    "counts": {
                        "books": store.len(),
                        "genres": genre_count
                    },
                    "error": store.error()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("Shelf Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Slot:     {}", store.key());
            match (slot_size, &slot_error) {
                (Some(size), _) => println!("  Size:     {}", format_size(size)),
                (None, Some(_)) => println!("  Size:     (unavailable)"),
                (None, None) => println!("  Size:     (not written yet)"),
            }
            println!();
            println!("Contents:");
            println!("  Books:  {}", store.len());
            println!("  Genres: {}", genre_count);
            if let Some(message) = store.error() {
                println!();
                println!("Error:");
                println!("  {}", message);
            }
        }
    }

    Ok(())
}

/// Size of the slot file; `Ok(None)` when it has not been written yet
fn inspect_slot(config: &Config, key: &str) -> Result<Option<u64>, StorageError> {
    FileSlotStore::new(config.data_dir.clone()).size_of(key)
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
