use serde::{Deserialize, Serialize};

/// Success body for `POST /api/images/generate`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImagesResponse {
    /// Exactly one URL per slot, in issuing order.
    pub image_urls: Vec<String>,
}
