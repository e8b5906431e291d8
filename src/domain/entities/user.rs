use super::subscription::now_millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription owner. Only the fields the mutation core needs; account
/// management lives elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxUser {
    pub id: Uuid,
    pub email: String,
    pub mobile: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FxUser {
    pub fn new(email: String, mobile: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            mobile,
            created_at: now_millis(),
        }
    }
}
