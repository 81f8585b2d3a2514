use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevokedToken {
    pub id: String,
    pub token: String,
    pub user_id: Option<String>,
    pub revoked_at: String,
}
