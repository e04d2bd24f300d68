use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::dtos::ErrorBody;

/// JSON extractor that also runs `validator` rules on the payload. Both a
/// malformed body and a failed rule produce the standard 400 error envelope.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody::new(format!("Invalid request body: {rejection}"))),
                )
                    .into_response()
            })?;

        if let Err(errors) = value.validate() {
            let messages: Vec<String> = errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("{field} is invalid"),
                    })
                })
                .collect();
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::with_errors(
                    "Validation failed".to_string(),
                    messages,
                )),
            )
                .into_response());
        }

        Ok(ValidatedJson(value))
    }
}
