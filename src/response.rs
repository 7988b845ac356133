use serde::{Deserialize, Serialize};

/// Successful response from the MineSkin generate endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinResponse {
    pub id: Option<u64>,
    #[serde(rename = "idStr", skip_serializing_if = "Option::is_none")]
    pub id_str: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub data: SkinData,
    #[serde(default)]
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Seconds the server wants us to wait before the next request.
    #[serde(rename = "nextRequest", skip_serializing_if = "Option::is_none")]
    pub next_request: Option<f64>,
}

/// Texture payload wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub texture: SkinTexture,
}

/// The signed texture property, directly usable in a game profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinTexture {
    pub value: String,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Error body MineSkin attaches to HTTP 500 responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub error: String,
}
