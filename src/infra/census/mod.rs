mod client;

pub use client::{CensusBatchClient, parse_batch_response};
