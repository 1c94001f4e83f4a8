//! Error types for the Bookshelf server

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A store failure collapsed into the operation's user-facing message
    #[error("{message}")]
    Failed {
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erreur interne du serveur.".to_string(),
                )
            }
            AppError::Failed { message, source } => {
                tracing::error!("{} ({})", message, source);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erreur interne du serveur.".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// User-facing messages
pub mod messages {
    pub const BOOK_NOT_FOUND: &str = "Livre non trouvé.";
    pub const RECORD_NOT_FOUND: &str = "Emprunt non trouvé.";
    pub const BOOK_ALREADY_BORROWED: &str = "Livre déjà emprunté.";
    pub const RECORD_ALREADY_RETURNED: &str = "Emprunt déjà retourné.";
    pub const UNKNOWN_USER: &str = "Utilisateur inconnu.";
    pub const MISSING_OWNER: &str = "Propriétaire du livre manquant (userId ou X-User-Id).";
    pub const DUE_BEFORE_BORROWED: &str = "La date de retour prévue précède la date d’emprunt.";
    pub const BOOK_DELETED: &str = "Livre supprimé avec succès.";

    pub const LIST_BOOKS_FAILED: &str = "Erreur lors de la récupération des livres.";
    pub const GET_BOOK_FAILED: &str = "Erreur lors de la récupération du livre.";
    pub const CREATE_BOOK_FAILED: &str = "Erreur lors de la création du livre.";
    pub const UPDATE_BOOK_FAILED: &str = "Erreur lors de la mise à jour du livre.";
    pub const DELETE_BOOK_FAILED: &str = "Erreur lors de la suppression du livre.";
    pub const LIST_CATEGORIES_FAILED: &str = "Erreur lors de la récupération des catégories.";
    pub const CREATE_CATEGORY_FAILED: &str = "Erreur lors de la création de la catégorie.";
    pub const LIST_RECORDS_FAILED: &str = "Erreur lors de la récupération des emprunts.";
    pub const GET_RECORD_FAILED: &str = "Erreur lors de la récupération de l’emprunt.";
    pub const CREATE_RECORD_FAILED: &str = "Erreur lors de la création de l’emprunt.";
    pub const UPDATE_RECORD_FAILED: &str = "Erreur lors de la mise à jour de l’emprunt.";
    pub const BORROW_FAILED: &str = "Erreur lors de l’emprunt du livre.";
    pub const RETURN_FAILED: &str = "Erreur lors du retour du livre.";
    pub const LIST_USERS_FAILED: &str = "Erreur lors de la récupération des utilisateurs.";
}

/// Attach an operation's generic failure message to store errors.
///
/// Client errors (not found, conflict, bad request) pass through untouched so
/// they keep their status code.
pub trait OrFail<T> {
    fn or_fail(self, message: &'static str) -> AppResult<T>;
}

impl<T> OrFail<T> for AppResult<T> {
    fn or_fail(self, message: &'static str) -> AppResult<T> {
        self.map_err(|e| match e {
            AppError::Database(_) | AppError::Internal(_) => AppError::Failed {
                message,
                source: Box::new(e),
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Livre non trouvé.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Livre non trouvé.");
    }

    #[tokio::test]
    async fn test_store_failure_uses_operation_message() {
        let result: AppResult<()> = Err(AppError::Database(sqlx::Error::PoolTimedOut));
        let err = result
            .or_fail("Erreur lors de la récupération des livres.")
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "Erreur lors de la récupération des livres."
        );
    }

    #[test]
    fn test_or_fail_keeps_client_errors() {
        let result: AppResult<()> = Err(AppError::Conflict("Livre déjà emprunté.".to_string()));
        assert!(matches!(
            result.or_fail("Erreur lors de l’emprunt du livre."),
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_request_keeps_message() {
        let response = AppError::BadRequest("En-tête X-User-Id manquant.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "En-tête X-User-Id manquant.");
    }
}
