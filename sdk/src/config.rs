/// Runtime settings for the claim flow.
///
/// Values come from hardcoded defaults, overridden by `PROMO_*`
/// environment variables (e.g. `PROMO_CAMPAIGN`, `PROMO_API_URL`).
use config::{Config, Environment, Source};
use serde::Deserialize;

use crate::compress::CompressionOptions;
use crate::error::ConfigError;

pub const DEFAULT_CAMPAIGN: &str = "Campaña Verano 2025";
pub const DEFAULT_API_URL: &str = "https://sorteopremiosservice.onrender.com";
pub const DEFAULT_UPLOAD_URL: &str = "https://ptm.pe/PremiosApp/upload.php";
pub const DEFAULT_STORE_PATH: &str = "./claim-results";

const ENV_PREFIX: &str = "PROMO";

/// `{api_url}/api/v1/claim`, tolerating a trailing slash on the base.
pub fn claim_endpoint(api_url: &str) -> String {
    format!("{}/api/v1/claim", api_url.trim_end_matches('/'))
}

/// `PROMO_*` variables, with numbers and booleans parsed from their text.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClaimConfig {
    pub campaign: String,
    pub api_url: String,
    pub upload_url: String,
    pub store_path: String,
    pub max_size_mb: f64,
    pub max_dimension: u32,
    pub require_dni: bool,
}

impl ClaimConfig {
    /// Defaults overridden by the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(environment())
    }

    /// Defaults overridden by an arbitrary source.
    pub fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .set_default("campaign", DEFAULT_CAMPAIGN)?
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("upload_url", DEFAULT_UPLOAD_URL)?
            .set_default("store_path", DEFAULT_STORE_PATH)?
            .set_default("max_size_mb", 1.0)?
            .set_default("max_dimension", 800_i64)?
            .set_default("require_dni", false)?
            .add_source(source)
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn claim_endpoint(&self) -> String {
        claim_endpoint(&self.api_url)
    }

    pub fn compression(&self) -> CompressionOptions {
        CompressionOptions::new(self.max_size_mb, self.max_dimension)
    }
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            campaign: DEFAULT_CAMPAIGN.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            store_path: DEFAULT_STORE_PATH.to_string(),
            max_size_mb: 1.0,
            max_dimension: 800,
            require_dni: false,
        }
    }
}
