//! Pipeline construction and execution engine for a small line-oriented shell.
//!
//! One command line comes in; it is split on `|` into segments, each segment
//! is tokenized and scanned for `<`/`>` redirections, and the segments run as
//! a chain of processes connected by pipes. The interactive loop lives in the
//! binary; everything here is callable as a library.

pub mod config;
pub mod error;
pub mod executor;
pub mod meta;
pub mod parse;
pub mod pipe;

pub use config::Limits;
pub use error::PipelineError;
pub use meta::PipelineResult;
