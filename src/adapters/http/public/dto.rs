use serde::{Deserialize, Serialize};

use crate::domain::foundation::ContactMessageId;

#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub id: ContactMessageId,
    pub received: bool,
}
