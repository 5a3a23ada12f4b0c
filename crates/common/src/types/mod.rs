use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Health {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl Health {
    pub fn healthy(message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), timestamp: timestamp.into() }
    }
}
