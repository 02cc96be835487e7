mod client;

pub use client::GoogleClient;
