use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::error_response;

/// `Json<T>` with rejections mapped to the shared error body. Malformed or
/// mistyped payloads are refused here, before any handler or store runs.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let status = rejection.status();
                // Normalize axum's 422 for deserialization failures to a plain 400.
                let status = if status.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    status
                };
                Err(error_response(status, "validation_error", &rejection.body_text())
                    .into_response())
            }
        }
    }
}
