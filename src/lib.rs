pub mod error;
pub mod features;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod records;
pub mod services;
