//! State behind the registration screen.

use log::{info, warn};

use crate::compress::{CompressedImage, ImageCompressor, RawImage};
use crate::config::ClaimConfig;
use crate::error::ValidationError;
use crate::model::{ClaimResult, Registrant};
use crate::pipeline::ClaimPipeline;
use crate::route::Route;
use crate::store::ResultRepository;
use crate::validation::FieldValidator;

/// Rendered instead of the form when the path carries no store.
pub const MISSING_STORE_NOTICE: &str =
    "Error: ID de tienda no encontrado en la URL. Asegúrate de escanear el QR correctamente.";

const STORE_BADGE_LEN: usize = 8;

/// Where to go after a successful submission, with the values to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub result: ClaimResult,
}

pub struct RegistrationScreen {
    pub name: String,
    pub dni: String,
    pub phone_number: String,
    /// Inline message under the title. Empty when there is nothing to say.
    pub message: String,
    store_id: Option<String>,
    photo: Option<CompressedImage>,
    compressing: bool,
    submitting: bool,
    compressor: ImageCompressor,
    validator: FieldValidator,
}

impl RegistrationScreen {
    pub fn new(store_id: Option<String>, config: &ClaimConfig) -> Self {
        Self {
            name: String::new(),
            dni: String::new(),
            phone_number: String::new(),
            message: String::new(),
            store_id: store_id.filter(|s| !s.is_empty()),
            photo: None,
            compressing: false,
            submitting: false,
            compressor: ImageCompressor::new(config.compression()),
            validator: FieldValidator::new(config.require_dni),
        }
    }

    pub fn store_id(&self) -> Option<&str> {
        self.store_id.as_deref()
    }

    pub fn photo(&self) -> Option<&CompressedImage> {
        self.photo.as_ref()
    }

    pub fn is_compressing(&self) -> bool {
        self.compressing
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// `None` when the form should not render at all.
    pub fn missing_store_notice(&self) -> Option<&'static str> {
        self.store_id.is_none().then_some(MISSING_STORE_NOTICE)
    }

    /// Shortened store id shown on the form, e.g. `a1b2c3d4...`.
    pub fn store_badge(&self) -> Option<String> {
        self.store_id.as_ref().map(|id| {
            let short: String = id.chars().take(STORE_BADGE_LEN).collect();
            format!("{}...", short)
        })
    }

    pub fn compressed_size_label(&self) -> Option<String> {
        self.photo
            .as_ref()
            .map(|p| format!("{:.1} KB", p.size() as f64 / 1024.0))
    }

    /// Mirrors the submit button's enabled state.
    pub fn can_submit(&self) -> bool {
        !self.submitting
            && !self.compressing
            && self.photo.is_some()
            && !self.name.trim().is_empty()
            && !self.phone_number.trim().is_empty()
    }

    /// Replaces the selected photo. `None` clears it. A file that cannot be
    /// compressed leaves no artifact behind and blocks submission.
    pub async fn select_photo(&mut self, raw: Option<RawImage>) {
        let raw = match raw {
            Some(raw) => raw,
            None => {
                self.photo = None;
                return;
            }
        };

        self.photo = None;
        self.compressing = true;
        self.message.clear();
        match self.compressor.compress(raw).await {
            Ok(compressed) => self.photo = Some(compressed),
            Err(e) => {
                warn!("Photo compression failed: {}", e);
                self.message = e.user_message();
            }
        }
        self.compressing = false;
    }

    /// Validates and submits. On failure the message is set and every
    /// field is left as entered.
    pub async fn submit<R: ResultRepository>(
        &mut self,
        pipeline: &ClaimPipeline<R>,
    ) -> Option<Navigation> {
        self.message.clear();

        let registrant = match self.registrant() {
            Ok(registrant) => registrant,
            Err(e) => {
                info!("Submission blocked: {}", e);
                self.message = e.user_message();
                return None;
            }
        };

        self.submitting = true;
        let outcome = pipeline.submit(&registrant).await;
        self.submitting = false;

        match outcome {
            Ok(result) => Some(Navigation {
                route: Route::Confirmation,
                result,
            }),
            Err(e) => {
                self.message = e.user_message();
                None
            }
        }
    }

    fn registrant(&self) -> Result<Registrant, ValidationError> {
        // A missing photo fails the presence rule, which outranks every other.
        let Some(photo) = self.photo.clone() else {
            return Err(ValidationError::MissingRequiredFields {
                dni_required: self.validator.require_dni,
            });
        };
        let fields = self
            .validator
            .validate(&self.name, &self.phone_number, &self.dni, true)?;
        let store_id = self.store_id.clone().ok_or(ValidationError::MissingStoreId)?;
        Ok(Registrant {
            name: fields.name,
            phone_number: fields.phone_number,
            dni: fields.dni,
            store_id,
            photo,
        })
    }
}
