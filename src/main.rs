//! Slotpack - column packing for calendar slots

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = slotpack_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
