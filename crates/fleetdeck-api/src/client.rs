// Boat data service HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction and error-body
// decoding. Every method returns the decoded wire types from `models`;
// conversion into domain types happens in `fleetdeck-core`.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{
    ApiBoat, ApiBoatEdit, ApiReview, BoatEditsRequest, ServiceErrorPayload,
};
use crate::transport::TransportConfig;

/// Raw HTTP client for the boat data service.
///
/// Cheap to clone: `reqwest::Client` is reference counted internally.
#[derive(Debug, Clone)]
pub struct BoatDataClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BoatDataClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the service root, e.g. `https://fleet.example.com/api`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /boats`: all boats, optionally restricted to one boat type.
    pub async fn list_boats(&self, boat_type_id: Option<&str>) -> Result<Vec<ApiBoat>, Error> {
        let url = self.endpoint(&["boats"])?;
        let query: Vec<(&str, String)> = boat_type_id
            .map(|id| vec![("boatTypeId", id.to_owned())])
            .unwrap_or_default();
        self.get(url, &query).await
    }

    /// `GET /boats/nearby`: boats ordered by distance from a position.
    pub async fn list_boats_near(
        &self,
        latitude: f64,
        longitude: f64,
        boat_type_id: Option<&str>,
    ) -> Result<Vec<ApiBoat>, Error> {
        let url = self.endpoint(&["boats", "nearby"])?;
        let mut query = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
        ];
        if let Some(id) = boat_type_id {
            query.push(("boatTypeId", id.to_owned()));
        }
        self.get(url, &query).await
    }

    /// `GET /boats/{id}/reviews`: every review for one boat.
    pub async fn list_reviews(&self, boat_id: &str) -> Result<Vec<ApiReview>, Error> {
        let url = self.endpoint(&["boats", boat_id, "reviews"])?;
        self.get(url, &[]).await
    }

    /// `PATCH /boats`: persist a batch of partial boat records.
    pub async fn update_boats(&self, edits: &[ApiBoatEdit]) -> Result<(), Error> {
        let url = self.endpoint(&["boats"])?;
        debug!(count = edits.len(), "PATCH {}", url);

        let resp = self
            .http
            .patch(url)
            .json(&BoatEditsRequest { data: edits })
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(service_error(resp).await);
        }
        trace!(%status, "boat edits accepted");
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Build `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;

        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(len = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| {
            let preview = body.chars().take(200).collect::<String>();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

/// Decode a non-2xx response into the most specific error available.
async fn service_error(resp: reqwest::Response) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    let decoded = serde_json::from_str::<ServiceErrorPayload>(&body)
        .ok()
        .and_then(ServiceErrorPayload::into_first);

    let (message, code) = match decoded {
        Some(err) => (
            err.message.unwrap_or_else(|| fallback_message(status)),
            err.error_code,
        ),
        None => (fallback_message(status), None),
    };

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::Authentication { message };
    }

    Error::Service {
        message,
        code,
        status: status.as_u16(),
    }
}

fn fallback_message(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
}
