//! High-level archive operations, one per tool mode

mod operations;
mod options;

pub use operations::{ComplexSummary, FstOperations, UnpackSummary};
pub use options::{PackOptions, UnpackOptions};
