// fleetdeck-api: Async Rust client for the fleetdeck boat data service

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::BoatDataClient;
pub use error::Error;
pub use models::{ApiBoat, ApiBoatEdit, ApiReview, ApiReviewer};
pub use transport::{TlsMode, TransportConfig};
