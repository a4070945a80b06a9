use serde::{Deserialize, Serialize};

use crate::compress::CompressedImage;

/// Prize shown when the claim service accepts a claim without naming one.
pub const DEFAULT_PRIZE: &str = "Un gran premio!";

/// A validated registration, ready to be submitted.
///
/// Lives only for the duration of one submission attempt.
#[derive(Debug, Clone)]
pub struct Registrant {
    pub name: String,
    pub phone_number: String,
    pub dni: Option<String>,
    pub store_id: String,
    pub photo: CompressedImage,
}

/// Successful outcome of the upload stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPhoto {
    /// Public URL of the stored photo. Empty when the endpoint omitted it.
    pub url: String,
}

/// JSON body sent to `{api}/api/v1/claim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPayload {
    pub name: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    pub store_id: String,
    pub campaign: String,
    pub photo_url: String,
}

impl ClaimPayload {
    /// Builds the payload. Requires the upload stage to have completed.
    pub fn new(registrant: &Registrant, campaign: &str, photo: &UploadedPhoto) -> Self {
        Self {
            name: registrant.name.clone(),
            phone_number: registrant.phone_number.clone(),
            dni: registrant.dni.clone(),
            store_id: registrant.store_id.clone(),
            campaign: campaign.to_string(),
            photo_url: photo.url.clone(),
        }
    }
}

/// What the registrant won. The only state kept across navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimResult {
    pub prize_name: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClaimResponse {
    pub prize: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClaimRejection {
    pub message: Option<String>,
}

impl ClaimResponse {
    /// Applies the prize and photo fallbacks. Empty strings count as absent.
    pub(crate) fn into_result(self, uploaded: &str) -> ClaimResult {
        let prize_name = non_empty(self.prize).unwrap_or_else(|| DEFAULT_PRIZE.to_string());
        let photo_url = non_empty(self.photo_url).or_else(|| non_empty(Some(uploaded.to_string())));
        ClaimResult {
            prize_name,
            photo_url,
        }
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
