use std::fmt;
use std::ops::Deref;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::middleware::Next;
use actix_web::{HttpMessage, HttpResponse, ResponseError, web};
use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authentication::{AuthError, JwtSecret, decode_token};

// Identity of the authenticated caller, attached to the request by
// `reject_anonymous_users`.
#[derive(Copy, Clone, Debug)]
pub struct UserId(Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Deref for UserId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::InvalidToken(_) => HttpResponse::Unauthorized()
                .insert_header((header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer")))
                .body("Unauthorized"),
            AuthError::UnexpectedError(_) => HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// Reject requests without a valid bearer token, or whose token names an
/// identity that is not on record, before they reach the handler.
/// Otherwise expose the caller as `web::ReqData<UserId>`.
pub async fn reject_anonymous_users(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let secret = req
        .app_data::<web::Data<JwtSecret>>()
        .context("The token secret is not registered as application data.")
        .map_err(AuthError::UnexpectedError)?;
    let pool = req
        .app_data::<web::Data<PgPool>>()
        .context("The connection pool is not registered as application data.")
        .map_err(AuthError::UnexpectedError)?;

    let user_id = bearer_token(req.headers())
        .map_err(AuthError::InvalidToken)
        .and_then(|token| decode_token(token, secret))
        .inspect_err(|e| tracing::info!(error.cause_chain = ?e, "Rejected anonymous request"))?;

    if !user_exists(pool, user_id).await? {
        tracing::info!(%user_id, "Rejected token for an unknown user");
        return Err(AuthError::InvalidToken(anyhow::anyhow!("Unknown user {}.", user_id)).into());
    }

    req.extensions_mut().insert(UserId(user_id));
    next.call(req).await
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, anyhow::Error> {
    headers
        .get(header::AUTHORIZATION)
        .context("The 'Authorization' header is missing")?
        .to_str()
        .context("The 'Authorization' header is not a valid UTF-8 string")?
        .strip_prefix("Bearer ")
        .context("The 'Authorization' header is not a Bearer token")
}

#[tracing::instrument(name = "Check token subject is on record", skip(pool))]
async fn user_exists(pool: &PgPool, user_id: Uuid) -> Result<bool, AuthError> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to perform a query to look up the token subject.")?;
    Ok(row.is_some())
}
