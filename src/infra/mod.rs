pub mod census;
pub mod google;
pub mod photon;
