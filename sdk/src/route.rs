use std::fmt;

pub const CONFIRMATION_PATH: &str = "/exit";
pub const HOME_PATH: &str = "/";

/// The screens reachable by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/<storeId>`
    Registration { store_id: String },
    /// `/exit`
    Confirmation,
    /// `/`
    Home,
}

impl Route {
    /// Matches a path against the known routes. The static confirmation
    /// path takes precedence over the store parameter.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Route::Home);
        }
        if trimmed == CONFIRMATION_PATH {
            return Some(Route::Confirmation);
        }
        let segment = trimmed.strip_prefix('/')?;
        if segment.is_empty() || segment.contains('/') {
            return None;
        }
        Some(Route::Registration {
            store_id: segment.to_string(),
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Registration { store_id } => write!(f, "/{}", store_id),
            Route::Confirmation => f.write_str(CONFIRMATION_PATH),
            Route::Home => f.write_str(HOME_PATH),
        }
    }
}
