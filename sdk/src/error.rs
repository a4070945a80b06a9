/// Error types for every stage of a claim submission.
///
/// `Display` is written for logs. Errors that end up in front of the
/// registrant also expose `user_message()`, the exact inline text the
/// registration screen shows.
use thiserror::Error;

/// Prefix shared by every inline error message.
const ERROR_MARK: &str = "❌";

/// Shown when the claim service rejects a claim without explaining why.
pub const GENERIC_CLAIM_FAILURE: &str = "Error en el registro del premio";

/// Shown when the claim service cannot be reached or answers garbage.
pub const CONNECTIVITY_FAILURE: &str = "No se pudo conectar al servidor de Premios";

fn inline(text: impl AsRef<str>) -> String {
    format!("{} {}", ERROR_MARK, text.as_ref())
}

/// A violated form rule, reported in fixed priority order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field missing (dni required: {dni_required})")]
    MissingRequiredFields { dni_required: bool },
    #[error("name exceeds {max} characters")]
    NameTooLong { max: usize },
    #[error("phone number must be exactly {len} digits")]
    InvalidPhone { len: usize },
    #[error("dni must be at most {max} digits")]
    InvalidDni { max: usize },
    #[error("store identifier is missing")]
    MissingStoreId,
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::MissingRequiredFields { dni_required: false } => {
                inline("Nombre, Teléfono y Foto son campos obligatorios.")
            }
            ValidationError::MissingRequiredFields { dni_required: true } => {
                inline("Nombre, DNI, Teléfono y Foto son campos obligatorios.")
            }
            ValidationError::NameTooLong { max } => {
                inline(format!("Nombre no debe exceder los {} caracteres.", max))
            }
            ValidationError::InvalidPhone { len } => {
                inline(format!("Teléfono debe tener exactamente {} dígitos.", len))
            }
            ValidationError::InvalidDni { max } => inline(format!(
                "DNI/Cédula no debe exceder los {} caracteres y solo acepta números.",
                max
            )),
            ValidationError::MissingStoreId => inline("Error crítico: ID de tienda no definido."),
        }
    }
}

/// Failure while shrinking a selected photo.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Unsupported or corrupt image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("JPEG encoding failed: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Compression worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl CompressionError {
    pub fn user_message(&self) -> String {
        inline("Error al comprimir la imagen.")
    }
}

/// Failure of the photo upload stage.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Error en la subida : {status} - {body}")]
    Status { status: u16, body: String },
}

impl UploadError {
    /// Converts a non-success upload response into an `UploadError`,
    /// keeping the status and whatever body the endpoint sent.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".into());
        UploadError::Status { status, body }
    }

    pub fn user_message(&self) -> String {
        inline(format!("Fallo crítico al subir la foto. {}", self))
    }
}

/// Failure of the claim stage.
#[derive(Error, Debug)]
pub enum ClaimError {
    /// No response at all (DNS, TLS, refused connection, ...).
    #[error("Claim service unreachable: {0}")]
    Connectivity(#[source] reqwest::Error),
    /// A response arrived but its body was not the expected JSON.
    #[error("Unreadable claim response: {0}")]
    MalformedResponse(#[source] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("Claim rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
}

impl ClaimError {
    pub fn user_message(&self) -> String {
        match self {
            ClaimError::Connectivity(_) | ClaimError::MalformedResponse(_) => {
                inline(CONNECTIVITY_FAILURE)
            }
            ClaimError::Rejected { message, .. } => {
                inline(message.as_deref().unwrap_or(GENERIC_CLAIM_FAILURE))
            }
        }
    }
}

/// Failure of the persisted result repository.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rocksdb::Error),
    #[error("Stored value for {key} is not valid UTF-8")]
    Encoding { key: String },
}

/// Failure while assembling configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Any failure that aborts a submission attempt.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("Claim failed: {0}")]
    Claim(#[from] ClaimError),
}

impl SubmissionError {
    /// The single inline message the registration screen displays.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation(e) => e.user_message(),
            SubmissionError::Upload(e) => e.user_message(),
            SubmissionError::Claim(e) => e.user_message(),
        }
    }
}
