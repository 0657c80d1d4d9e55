// ── Remote data service seam ──
//
// Every component talks to the boat data service through the
// `BoatDataService` trait so the HTTP client can be swapped for an
// in-memory fake in tests.

use std::future::Future;

use tracing::debug;

use fleetdeck_api::transport::{TlsMode, TransportConfig};
use fleetdeck_api::{ApiBoatEdit, BoatDataClient};

use crate::config::{ServiceConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Boat, BoatEdit, BoatFilter, BoatId, Coordinates, ReviewEntry};

/// The four remote operations the dashboard depends on.
pub trait BoatDataService: Send + Sync + 'static {
    /// All boats matching `filter`.
    fn fetch_boats(
        &self,
        filter: &BoatFilter,
    ) -> impl Future<Output = Result<Vec<Boat>, CoreError>> + Send;

    /// Boats matching `filter`, nearest to `position` first. Returned
    /// boats carry their `location`.
    fn fetch_boats_by_location(
        &self,
        position: Coordinates,
        filter: &BoatFilter,
    ) -> impl Future<Output = Result<Vec<Boat>, CoreError>> + Send;

    /// Every review of one boat.
    fn fetch_reviews(
        &self,
        boat_id: &BoatId,
    ) -> impl Future<Output = Result<Vec<ReviewEntry>, CoreError>> + Send;

    /// Persist a batch of partial boat records.
    fn persist_boat_edits(
        &self,
        edits: Vec<BoatEdit>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── HTTP-backed implementation ──────────────────────────────────────

/// [`BoatDataService`] backed by the real HTTP API.
#[derive(Debug, Clone)]
pub struct ApiDataService {
    client: BoatDataClient,
}

impl ApiDataService {
    /// Build the HTTP client from a [`ServiceConfig`].
    pub fn connect(config: &ServiceConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = BoatDataClient::new(config.url.clone(), &transport)?;
        debug!(url = %config.url, "boat data service client ready");
        Ok(Self { client })
    }

    /// Wrap an already-built client.
    pub fn from_client(client: BoatDataClient) -> Self {
        Self { client }
    }
}

impl BoatDataService for ApiDataService {
    async fn fetch_boats(&self, filter: &BoatFilter) -> Result<Vec<Boat>, CoreError> {
        let boats = self.client.list_boats(filter.type_id()).await?;
        Ok(boats.into_iter().map(Boat::from).collect())
    }

    async fn fetch_boats_by_location(
        &self,
        position: Coordinates,
        filter: &BoatFilter,
    ) -> Result<Vec<Boat>, CoreError> {
        let boats = self
            .client
            .list_boats_near(position.latitude, position.longitude, filter.type_id())
            .await?;
        Ok(boats.into_iter().map(Boat::from).collect())
    }

    async fn fetch_reviews(&self, boat_id: &BoatId) -> Result<Vec<ReviewEntry>, CoreError> {
        let reviews = self.client.list_reviews(boat_id.as_str()).await?;
        Ok(reviews
            .into_iter()
            .map(|r| ReviewEntry::from_api(r, boat_id))
            .collect())
    }

    async fn persist_boat_edits(&self, edits: Vec<BoatEdit>) -> Result<(), CoreError> {
        let payload: Vec<ApiBoatEdit> = edits.into_iter().map(ApiBoatEdit::from).collect();
        self.client.update_boats(&payload).await?;
        Ok(())
    }
}

/// Build a [`TransportConfig`] from the service configuration.
fn build_transport(config: &ServiceConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        api_token: config.api_token.clone(),
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
