//! Token metadata upload handler.
//!
//! Uploads the deal image, then a Metaplex-style JSON document pointing at it.

use std::net::IpAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Fallback content type when the source does not declare one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Create URI request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUriRequest {
    /// `data:` URL or `http(s)` URL of the image.
    pub image_data: String,
    /// Metadata entered by the merchant.
    pub metadata: MetadataInput,
}

/// Metadata fields supplied by the merchant.
#[derive(Debug, Deserialize)]
pub struct MetadataInput {
    /// Token name.
    pub name: String,
    /// Token description.
    #[serde(default)]
    pub description: String,
    /// Extra attributes, kept in order.
    #[serde(default)]
    pub attributes: Vec<serde_json::Value>,
}

/// Token metadata document as uploaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenMetadata {
    /// Token name.
    pub name: String,
    /// Token description.
    pub description: String,
    /// Image URI.
    pub image: String,
    /// Marketplace link.
    pub external_url: String,
    /// Attributes, always ending with `redeemed = "false"`.
    pub attributes: Vec<serde_json::Value>,
    /// File listing.
    pub properties: MetadataProperties,
}

/// `properties` block of token metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataProperties {
    /// Files making up the asset.
    pub files: Vec<MetadataFile>,
    /// Asset category.
    pub category: String,
}

/// One file in `properties.files`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataFile {
    /// File URI.
    pub uri: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Create URI response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUriResponse {
    /// Always `true`.
    pub success: bool,
    /// Uploaded image URI.
    pub image_url: String,
    /// Image MIME type.
    pub image_type: String,
    /// Uploaded metadata URI.
    pub metadata_uri: String,
    /// The uploaded document.
    pub metadata: TokenMetadata,
}

/// Build the metadata document for an uploaded image.
#[must_use]
pub fn compose_metadata(
    input: MetadataInput,
    image_uri: &str,
    image_type: &str,
    external_url: &str,
) -> TokenMetadata {
    let mut attributes = input.attributes;
    attributes.push(serde_json::json!({
        "trait_type": "redeemed",
        "value": "false",
    }));

    TokenMetadata {
        name: input.name,
        description: input.description,
        image: image_uri.to_string(),
        external_url: external_url.to_string(),
        attributes,
        properties: MetadataProperties {
            files: vec![MetadataFile {
                uri: image_uri.to_string(),
                content_type: image_type.to_string(),
            }],
            category: "image".to_string(),
        },
    }
}

/// Decode a base64 `data:` URL into its MIME type and bytes.
///
/// Returns `None` for anything that is not a base64 data URL.
#[must_use]
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;

    let mime = if mime.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        mime
    };
    Some((mime.to_string(), bytes))
}

/// Whether `host` names a publicly routable address.
///
/// Literal loopback, private, link-local and unspecified addresses are
/// refused, as is `localhost`. Names are not resolved.
#[must_use]
pub(crate) fn is_public_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.eq_ignore_ascii_case("localhost") || host.to_ascii_lowercase().ends_with(".localhost") {
        return false;
    }

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            !(ip.is_loopback()
                || ip.is_private()
                || ip.is_link_local()
                || ip.is_unspecified()
                || ip.is_broadcast())
        }
        Ok(IpAddr::V6(ip)) => {
            if let Some(mapped) = ip.to_ipv4_mapped() {
                return is_public_host(&mapped.to_string());
            }
            let first = ip.segments()[0];
            // fc00::/7 unique local, fe80::/10 link-local
            !(ip.is_loopback()
                || ip.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
        Err(_) => true,
    }
}

/// Whether `url` may be fetched under the given host policy.
pub(crate) fn is_allowed_image_url(url: &reqwest::Url, allow_private: bool) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url
            .host_str()
            .is_some_and(|host| allow_private || is_public_host(host))
}

/// Resolve the image bytes and their content type.
///
/// Remote images must answer with a success status and an `image/*`
/// content type, and may not exceed `max_body_bytes`.
async fn load_image(state: &AppState, image_data: &str) -> Result<(String, Vec<u8>), ApiError> {
    if image_data.starts_with("data:") {
        return decode_data_url(image_data)
            .ok_or_else(|| ApiError::BadRequest("imageData is not a base64 data URL".into()));
    }

    let url = reqwest::Url::parse(image_data)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .ok_or_else(|| {
            ApiError::BadRequest("imageData must be a data URL or an http(s) URL".into())
        })?;

    if !is_allowed_image_url(&url, state.config.allow_private_image_hosts) {
        return Err(ApiError::BadRequest(
            "imageData must point at a public host".into(),
        ));
    }

    let mut response = state
        .http
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| ApiError::ExternalService(format!("failed to fetch image: {e}")))?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(ApiError::BadRequest(format!(
            "imageData is not an image (content type {content_type:?})"
        )));
    }

    let limit = state.config.max_body_bytes;
    let too_large = || ApiError::PayloadTooLarge(format!("image exceeds {limit} bytes"));

    if response
        .content_length()
        .is_some_and(|len| u64::try_from(limit).is_ok_and(|limit| len > limit))
    {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ApiError::ExternalService(format!("failed to read image: {e}")))?
    {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok((content_type, bytes))
}

/// Upload an image and its token metadata.
pub async fn create_uri(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUriRequest>, JsonRejection>,
) -> Result<Json<CreateUriResponse>, ApiError> {
    let Json(request) = payload?;

    let uploader = state
        .uploader
        .clone()
        .ok_or_else(|| ApiError::ExternalService("uploader not configured".into()))?;

    let (image_type, image) = load_image(&state, &request.image_data).await?;
    tracing::info!(size = image.len(), image_type = %image_type, "Uploading image");

    let image_url = uploader.upload(image, &image_type).await?;

    let metadata = compose_metadata(
        request.metadata,
        &image_url,
        &image_type,
        &state.config.external_url,
    );
    let document = serde_json::to_value(&metadata)
        .map_err(|e| ApiError::Internal(format!("failed to encode metadata: {e}")))?;

    let metadata_uri = uploader.upload_json(&document).await?;
    tracing::info!(metadata_uri = %metadata_uri, "Metadata uploaded");

    Ok(Json(CreateUriResponse {
        success: true,
        image_url,
        image_type,
        metadata_uri,
        metadata,
    }))
}
