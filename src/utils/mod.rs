//! Shared helpers for the command line and corpus builds

pub mod progress;

pub use progress::{ProgressBar, ProgressStyle, file_progress};
