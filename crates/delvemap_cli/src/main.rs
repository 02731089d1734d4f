//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `delvemap_core` linkage.
//! - Optionally list maps saved in a snapshot database.

use delvemap_core::{open_db, SnapshotRepository, SqliteSnapshotRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("delvemap_core version={}", delvemap_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match list_saved_maps(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn list_saved_maps(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let repo = SqliteSnapshotRepository::try_new(&conn)?;
    let maps = repo.list_maps()?;
    println!("maps={}", maps.len());
    for map in maps {
        println!(
            "{} cards={} connections={} updated_at={} name={}",
            map.map_id, map.card_count, map.connection_count, map.updated_at, map.name
        );
    }
    Ok(())
}
