//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notekeeper_core` linkage and one full store round trip.
//! - Keep output deterministic apart from generated ids.

use notekeeper_core::db::open_db_in_memory;
use notekeeper_core::{DocumentStore, NewNote, SqliteKvRepository};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notekeeper_core ping={}", notekeeper_core::ping());
    println!("notekeeper_core version={}", notekeeper_core::core_version());

    match store_probe() {
        Ok((notebooks, notes)) => {
            println!("notekeeper_core store=ok notebooks={notebooks} notes={notes}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("notekeeper_core store=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn store_probe() -> Result<(usize, usize), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let repo = SqliteKvRepository::try_new(&conn)?;
    let mut store = DocumentStore::open(repo)?;

    let notebook = store.add_notebook("Probe")?;
    store.add_note(&notebook.id, NewNote::new("hello", "world"))?;

    let notebooks = store.fetch_notebooks()?.len();
    let notes = store.fetch_notes(&notebook.id)?.len();
    Ok((notebooks, notes))
}
