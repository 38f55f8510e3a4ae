use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the analysis pipeline (fetch, indicators, scoring, risk levels).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// No data from any exchange suffix.
    #[error("No market data for {0}")]
    InvalidSymbol(String),

    #[error("Insufficient price history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// Non-2xx or malformed response from a market-data or broker API.
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Computation error: {0}")]
    Computation(String),
}

impl AnalysisError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidSymbol(_) => "invalid_symbol",
            AnalysisError::InsufficientHistory { .. } => "insufficient_history",
            AnalysisError::ExternalService(_) => "external_service",
            AnalysisError::Computation(_) => "computation",
        }
    }

    /// Whether the symbol is simply not analyzable yet (unknown or too new),
    /// as opposed to something having gone wrong.
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidSymbol(_) | AnalysisError::InsufficientHistory { .. }
        )
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// One or both symbols of a comparison could not be resolved.
    #[error("Invalid stock symbols")]
    InvalidSymbols,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::InvalidSymbols => "invalid_symbol",
            AppError::Analysis(e) => e.kind(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidSymbols => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Analysis(AnalysisError::InvalidSymbol(_)) => {
                (StatusCode::NOT_FOUND, "Invalid stock symbol".to_string())
            }
            AppError::Analysis(e @ AnalysisError::InsufficientHistory { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::Analysis(e @ AnalysisError::ExternalService(_)) => {
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Analysis(e @ AnalysisError::Computation(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_analysis_error_kinds() {
        assert_eq!(AnalysisError::InvalidSymbol("X".into()).kind(), "invalid_symbol");
        assert_eq!(
            AnalysisError::InsufficientHistory { required: 20, available: 3 }.kind(),
            "insufficient_history"
        );
        assert_eq!(AnalysisError::ExternalService("x".into()).kind(), "external_service");
        assert_eq!(AnalysisError::Computation("x".into()).kind(), "computation");
    }

    #[test]
    fn test_not_ready_classification() {
        assert!(AnalysisError::InvalidSymbol("X".into()).is_not_ready());
        assert!(AnalysisError::InsufficientHistory { required: 2, available: 1 }.is_not_ready());
        assert!(!AnalysisError::ExternalService("timeout".into()).is_not_ready());
        assert!(!AnalysisError::Computation("nan".into()).is_not_ready());
    }

    #[test]
    fn test_insufficient_history_message() {
        let err = AnalysisError::InsufficientHistory { required: 150, available: 60 };
        assert_eq!(err.to_string(), "Insufficient price history: need 150 bars, have 60");
    }

    #[tokio::test]
    async fn test_invalid_symbol_keeps_legacy_message() {
        let response =
            AppError::from(AnalysisError::InvalidSymbol("NOPE".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid stock symbol");
        assert_eq!(body["kind"], "invalid_symbol");
    }

    #[tokio::test]
    async fn test_distinct_statuses_per_kind() {
        let cases = vec![
            (
                AppError::from(AnalysisError::InsufficientHistory { required: 21, available: 5 }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(AnalysisError::ExternalService("502 from upstream".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::from(AnalysisError::Computation("nan".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::BadRequest("missing stock".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidSymbols, StatusCode::NOT_FOUND),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_invalid_symbols_message() {
        let body = body_json(AppError::InvalidSymbols.into_response()).await;
        assert_eq!(body["error"], "Invalid stock symbols");
    }
}
