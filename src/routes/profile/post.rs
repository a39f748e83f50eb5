use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde_json::{Map, Value};

use crate::authentication::UserId;
use crate::domain::{ProfileInput, ProfileValidator};
use crate::profile_upsert::{UpsertError, upsert_profile};
use crate::store::ProfileStore;

impl ResponseError for UpsertError {
    fn status_code(&self) -> StatusCode {
        match self {
            UpsertError::ValidationError(_) | UpsertError::HandleConflict => {
                StatusCode::BAD_REQUEST
            }
            UpsertError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            UpsertError::ValidationError(errors) => HttpResponse::BadRequest().json(errors),
            UpsertError::HandleConflict => HttpResponse::BadRequest()
                .json(serde_json::json!({ "handle": "That handle already exists" })),
            UpsertError::UnexpectedError(_) => HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// Answer unreadable request bodies with the same JSON error map as field
/// validation, keyed under `body`.
pub fn profile_body_error(e: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(serde_json::json!({ "body": e.to_string() }));
    InternalError::from_response(e, response).into()
}

/// Create or update the caller's profile from the submitted fields.
#[tracing::instrument(
    name = "Save profile",
    skip(store, validator, user_id, body),
    fields(user_id = tracing::field::Empty)
)]
pub async fn save_profile(
    store: web::Data<dyn ProfileStore>,
    validator: web::Data<dyn ProfileValidator>,
    user_id: web::ReqData<UserId>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, UpsertError> {
    let user_id = user_id.into_inner();
    tracing::Span::current().record("user_id", tracing::field::display(&user_id));

    let input = ProfileInput::from_json(body.into_inner()).map_err(UpsertError::ValidationError)?;
    let profile = upsert_profile(store.get_ref(), validator.get_ref(), *user_id, input).await?;
    Ok(HttpResponse::Ok().json(profile))
}
