use crate::counters::SessionCounters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit of isolation for every natural key
///
/// Counters are derived data: only the counter maintainer writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(flatten)]
    pub counters: SessionCounters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
