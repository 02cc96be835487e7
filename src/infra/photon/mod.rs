mod client;

pub use client::PhotonClient;
