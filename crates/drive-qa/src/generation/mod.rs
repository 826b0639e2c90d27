//! Answer generation over the combined document text

pub mod answerer;

pub use answerer::QueryAnswerer;
