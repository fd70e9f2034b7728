//! CLI command implementations.

pub mod batch;
pub mod extract;

pub use batch::BatchCommand;
pub use extract::ExtractCommand;
