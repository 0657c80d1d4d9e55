// ── Geolocation capability ──
//
// One-shot position providers. Callers check `is_available()` before
// asking; an unavailable provider is not an error condition.

use std::future::Future;

use crate::error::CoreError;
use crate::model::Coordinates;

pub trait GeolocationProvider: Send + Sync + 'static {
    /// Whether this device can provide a position at all.
    fn is_available(&self) -> bool;

    /// Request a single position sample.
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, CoreError>> + Send;
}

/// A provider that always reports the same, preconfigured position.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl GeolocationProvider for FixedPosition {
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, CoreError> {
        Ok(self.0)
    }
}

/// A device without geolocation support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

impl GeolocationProvider for NoGeolocation {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, CoreError> {
        Err(CoreError::CapabilityUnavailable)
    }
}
