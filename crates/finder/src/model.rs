use {
    crate::SessionConfig,
    com::ComError,
    serde::{Deserialize, Serialize},
};

/// What `/api/model-info` reports about the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub device: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Reply of `/api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub model_loaded: bool,
    #[serde(default)]
    pub device: Option<String>,
}

impl Health {
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}

pub async fn fetch_model_info(config: &SessionConfig) -> Result<ModelInfo, ComError> {
    com::http::get_json(&config.model_info_url(), config.http_timeout()).await
}

pub async fn fetch_health(config: &SessionConfig) -> Result<Health, ComError> {
    com::http::get_json(&config.health_url(), config.http_timeout()).await
}
