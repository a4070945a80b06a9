//! State behind the confirmation screen.

use log::debug;

use crate::error::StoreError;
use crate::model::ClaimResult;
use crate::route::Route;
use crate::store::{ResultRepository, ResultStore};

/// Shown when the screen is opened without any result to display.
pub const NO_RESULT_MESSAGE: &str =
    "¡Gracias por participar! Contacta a la tienda para más detalles.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationScreen {
    /// Prize name, or the thank-you fallback.
    pub headline: String,
    pub photo_url: Option<String>,
}

impl ConfirmationScreen {
    /// Values passed along with the navigation win. Without them (a reload
    /// or a direct visit) the persisted result is used.
    pub fn open<R: ResultRepository>(
        passed: Option<&ClaimResult>,
        store: &ResultStore<R>,
    ) -> Result<Self, StoreError> {
        if let Some(result) = passed {
            return Ok(Self {
                headline: result.prize_name.clone(),
                photo_url: result.photo_url.clone().filter(|u| !u.is_empty()),
            });
        }

        let stored = store.load()?;
        debug!("Confirmation opened standalone");
        Ok(Self {
            headline: stored
                .prize_name
                .unwrap_or_else(|| NO_RESULT_MESSAGE.to_string()),
            photo_url: stored.photo_url,
        })
    }

    /// "Return home": forgets the stored result before leaving.
    pub fn return_home<R: ResultRepository>(store: &ResultStore<R>) -> Result<Route, StoreError> {
        store.clear()?;
        Ok(Route::Home)
    }
}
