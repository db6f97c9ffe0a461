//! Application use cases / business logic

pub mod diff;
pub mod report;
pub mod run_loop;

pub use diff::diff;
pub use report::format_report;
pub use run_loop::{ConfigError, CycleError, RunLoop, RunLoopConfig};
