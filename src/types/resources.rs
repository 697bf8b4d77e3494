use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::ResourceKind;

/// Direct link (or folder) entry. File-backed resources go through the
/// multipart upload route instead.
#[derive(Deserialize, ToSchema)]
pub struct CreateResourceRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: Option<String>,
}
