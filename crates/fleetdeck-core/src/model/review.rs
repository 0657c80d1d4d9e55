// ── Review domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::boat::BoatId;

/// A single review of a boat. Immutable once fetched; the reviews
/// component replaces its whole collection on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub id: String,
    pub boat_id: BoatId,
    pub reviewer_id: Option<String>,
    pub reviewer_name: Option<String>,
    pub title: Option<String>,
    pub text: String,
    /// 1-5 stars, when the reviewer left a rating.
    pub rating: Option<u8>,
    pub created_at: Option<DateTime<Utc>>,
}
