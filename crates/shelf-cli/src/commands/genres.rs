//! Genre command handlers

use anyhow::Result;

use shelf_core::BookStore;

use crate::output::Output;

/// List all genres with book counts
pub fn list(store: &BookStore, output: &Output) -> Result<()> {
    let genres = store.genres_with_counts();
    output.print_genres(&genres);
    Ok(())
}
