/*!
# Claim SDK

This crate implements the registration side of an in-store promotional campaign. A visitor
scans a store-specific code, fills in their details, attaches a photo, and submits a claim to
the remote prize-allocation service. On success they are shown the prize they won.

## Purpose

The crate owns everything behind the two screens of the flow:

- **Field validation** (`validation`): name, phone and DNI rules, checked in a fixed priority
  order on trimmed input.
- **Image compression** (`compress`): shrinks the selected photo below a byte and dimension
  ceiling on a blocking worker.
- **Upload** (`UploadClient`): one multipart POST of the compressed photo to a fixed endpoint,
  answering with the public URL of the stored file.
- **Claim** (`ClaimClient`): one JSON POST to `{api}/api/v1/claim`, answering with the prize.
- **Result persistence** (`store`): keeps the latest prize and photo so the confirmation screen
  survives a reload.
- **Submission pipeline** (`pipeline`): upload, then claim, then persist, strictly in order.
- **Screens** (`registration`, `confirmation`, `route`): the state a front end renders.

## Usage

```rust,no_run
use claim_sdk::{
    ClaimConfig, ClaimPipeline, MemoryRepository, RawImage, RegistrationScreen, ResultStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClaimConfig::load()?;
    let pipeline = ClaimPipeline::from_config(&config, ResultStore::new(MemoryRepository::new()));

    let mut screen = RegistrationScreen::new(Some("store-42".to_string()), &config);
    screen.name = "Ana".to_string();
    screen.phone_number = "987654321".to_string();
    screen
        .select_photo(Some(RawImage {
            file_name: "selfie.jpg".to_string(),
            bytes: std::fs::read("selfie.jpg")?,
        }))
        .await;

    match screen.submit(&pipeline).await {
        Some(navigation) => println!("Won: {:?}", navigation),
        None => println!("{}", screen.message),
    }
    Ok(())
}
```

## Error Handling

Each stage has its own error type (`ValidationError`, `CompressionError`, `UploadError`,
`ClaimError`, `StoreError`). Their `Display` is meant for logs; `user_message()` gives the
inline text shown to the registrant. Nothing is retried: a failed attempt leaves the form as
it was so the registrant can correct it and submit again.
*/

// Re-export key types for easier access
pub use crate::compress::*;
pub use crate::config::*;
pub use crate::confirmation::*;
pub use crate::error::*;
pub use crate::model::*;
pub use crate::pipeline::*;
pub use crate::registration::*;
pub use crate::route::*;
pub use crate::store::*;
pub use crate::validation::*;

use log::{debug, info};
use reqwest::multipart::{Form, Part};

use crate::model::{ClaimRejection, ClaimResponse, UploadResponse};

pub mod compress;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod registration;
pub mod route;
pub mod store;
pub mod validation;

/// Client for the photo upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadClient {
    client: reqwest::Client, // HTTP client for sending requests
    upload_url: String,      // Full URL of the upload endpoint
}

impl UploadClient {
    /// Creates a new `UploadClient` posting to `upload_url`.
    pub fn new(upload_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), upload_url)
    }

    pub fn with_client(client: reqwest::Client, upload_url: &str) -> Self {
        Self {
            client,
            upload_url: upload_url.to_string(),
        }
    }

    /// Uploads the compressed photo as the `photo` part of a multipart form.
    ///
    /// # Returns
    /// * `Ok(UploadedPhoto)` - The URL from the JSON body. Empty when the endpoint
    ///   did not include one.
    ///
    /// # Errors
    /// Returns `UploadError` for:
    /// - Transport failures, or a body that is not JSON.
    /// - Non-success status codes, carrying the status and response text.
    pub async fn upload(&self, photo: &CompressedImage) -> Result<UploadedPhoto, UploadError> {
        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.content_type)?;
        let form = Form::new().part("photo", part);

        info!(
            "Uploading {} ({} bytes) to {}",
            photo.file_name,
            photo.size(),
            self.upload_url
        );
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::from_response(response).await);
        }

        let body = response.json::<UploadResponse>().await?;
        let url = body.url.unwrap_or_default();
        debug!("Upload answered with url {:?}", url);
        Ok(UploadedPhoto { url })
    }
}

/// Client for the campaign claim service.
#[derive(Debug, Clone)]
pub struct ClaimClient {
    client: reqwest::Client, // HTTP client for sending requests
    endpoint: String,        // `{api_url}/api/v1/claim`
}

impl ClaimClient {
    /// Creates a new `ClaimClient` for the service rooted at `api_url`.
    pub fn new(api_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            endpoint: claim_endpoint(api_url),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submits the claim and resolves the awarded prize.
    ///
    /// # Returns
    /// * `Ok(ClaimResult)` - The prize (or the default prize when the service names
    ///   none) and the service's photo URL, falling back to the uploaded one.
    ///
    /// # Errors
    /// Returns `ClaimError` for:
    /// - No response at all (`Connectivity`).
    /// - A response body that is not JSON (`MalformedResponse`).
    /// - Non-success status codes (`Rejected`), with the service's `message` if any.
    pub async fn claim(&self, payload: &ClaimPayload) -> Result<ClaimResult, ClaimError> {
        info!(
            "Claiming for store {} in campaign {:?}",
            payload.store_id, payload.campaign
        );
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(ClaimError::Connectivity)?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<ClaimResponse>()
                .await
                .map_err(ClaimError::MalformedResponse)?;
            let result = body.into_result(&payload.photo_url);
            info!("Claim accepted, prize {:?}", result.prize_name);
            Ok(result)
        } else {
            let body = response
                .json::<ClaimRejection>()
                .await
                .map_err(ClaimError::MalformedResponse)?;
            Err(ClaimError::Rejected {
                status: status.as_u16(),
                message: model::non_empty(body.message),
            })
        }
    }
}
