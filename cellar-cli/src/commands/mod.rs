//! Command implementations for the `cellar` binary.
//!
//! Each subcommand lives in its own module with an `*Args` struct (built by
//! `main.rs` from the parsed `clap` arguments) and a `run_*` entry point, the
//! way `faxt`'s command modules are split.

pub mod fetch;
pub mod gc;
pub mod import;
pub mod inspect;
pub mod plan;

pub use fetch::{run_fetch, FetchArgs};
pub use gc::{run_gc, GcArgs};
pub use import::{run_import, ImportArgs};
pub use inspect::{run_inspect, InspectArgs};
pub use plan::{run_plan, PlanArgs};
