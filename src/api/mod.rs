pub mod analyze;
pub mod compare;
pub mod health;
pub mod scan;

use crate::error::AppError;
use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(analyze::router())
        .merge(scan::router())
        .merge(compare::router())
}

/// Unwrap a query parameter that must be present and non-blank.
pub(crate) fn required_param(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!(
            "missing query parameter: {}",
            name
        ))),
    }
}
