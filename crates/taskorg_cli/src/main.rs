//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskorg_core` linkage and the
//!   storage bootstrap, independently of any serving runtime.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use taskorg_core::{dashboard, db, SqliteStore};

fn main() -> ExitCode {
    println!("taskorg_core version={}", taskorg_core::core_version());

    let conn = match db::open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("store bootstrap failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let store = SqliteStore::new(&conn);
    match dashboard::counts(&store) {
        Ok(counts) => {
            println!(
                "store ok: tasks={} subtasks={} notes={}",
                counts.tasks.total, counts.subtasks.total, counts.notes.total
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("dashboard probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}
