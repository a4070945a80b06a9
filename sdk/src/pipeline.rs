//! Two-stage submission: upload the photo, then claim the prize.
//!
//! The claim stage only runs once the upload stage has produced an
//! `UploadedPhoto`. Each stage hands back a `Result`, so the first failure
//! ends the attempt and nothing is retried.

use log::{error, info, warn};

use crate::config::ClaimConfig;
use crate::error::SubmissionError;
use crate::model::{ClaimPayload, ClaimResult, Registrant, UploadedPhoto};
use crate::store::{ResultRepository, ResultStore};
use crate::{ClaimClient, UploadClient};

pub struct ClaimPipeline<R> {
    uploader: UploadClient,
    claimer: ClaimClient,
    store: ResultStore<R>,
    campaign: String,
}

impl<R: ResultRepository> ClaimPipeline<R> {
    pub fn new(
        uploader: UploadClient,
        claimer: ClaimClient,
        store: ResultStore<R>,
        campaign: &str,
    ) -> Self {
        Self {
            uploader,
            claimer,
            store,
            campaign: campaign.to_string(),
        }
    }

    /// Builds both clients from `config`, sharing one HTTP connection pool.
    pub fn from_config(config: &ClaimConfig, store: ResultStore<R>) -> Self {
        let client = reqwest::Client::new();
        Self::new(
            UploadClient::with_client(client.clone(), &config.upload_url),
            ClaimClient::with_client(client, &config.api_url),
            store,
            &config.campaign,
        )
    }

    pub fn store(&self) -> &ResultStore<R> {
        &self.store
    }

    pub fn campaign(&self) -> &str {
        &self.campaign
    }

    /// Stage one. Must succeed before a payload can be built.
    pub async fn upload(&self, registrant: &Registrant) -> Result<UploadedPhoto, SubmissionError> {
        let uploaded = self.uploader.upload(&registrant.photo).await.map_err(|e| {
            error!("Photo upload failed: {}", e);
            e
        })?;
        if uploaded.url.is_empty() {
            warn!("Upload endpoint returned no url, claiming without one");
        }
        Ok(uploaded)
    }

    /// Stage two.
    pub async fn claim(
        &self,
        registrant: &Registrant,
        uploaded: &UploadedPhoto,
    ) -> Result<ClaimResult, SubmissionError> {
        let payload = ClaimPayload::new(registrant, &self.campaign, uploaded);
        let result = self.claimer.claim(&payload).await.map_err(|e| {
            error!("Claim failed: {}", e);
            e
        })?;
        Ok(result)
    }

    /// Runs both stages and persists the result.
    ///
    /// A persistence failure is logged but does not fail the submission;
    /// the caller still gets the result to hand to the confirmation screen.
    pub async fn submit(&self, registrant: &Registrant) -> Result<ClaimResult, SubmissionError> {
        let uploaded = self.upload(registrant).await?;
        let result = self.claim(registrant, &uploaded).await?;

        if let Err(e) = self.store.save(&result) {
            warn!("Could not persist claim result: {}", e);
        }
        info!(
            "Submission for store {} finished with prize {:?}",
            registrant.store_id, result.prize_name
        );
        Ok(result)
    }
}
