//! Parallel processing module for docsum
//!
//! Every input file is streamed by a worker thread; partial aggregates flow
//! to a single collector which holds them until all workers are done.
//!
//! # Module Structure
//!
//! - `types`: Configuration, job and outcome types
//! - `worker`: File worker thread (read, parse, filter, aggregate)
//! - `collector`: Partial collection by sort or map strategy
//! - `processor`: Main ParallelProcessor orchestration

mod collector;
mod processor;
mod types;
mod worker;

// Re-export public types
pub use collector::Collected;
pub use processor::ParallelProcessor;
pub use types::{CollectionOutcome, ParallelConfig};
