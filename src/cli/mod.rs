//! # Command-Line Interface
//!
//! ```bash
//! auto-backup backup.toml                    # run every task
//! auto-backup --tag daily backup.toml        # only tasks tagged "daily"
//! auto-backup --tag daily --tag weekly backup.toml
//! ```
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG=debug` to see
//! every spawned command line.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the configured tasks.

mod app;
mod setup;

pub use app::{run, run_with, Cli};
pub use setup::{ProgramSetup, NOTIFICATION_KEY};
