use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use uuid::Uuid;

use crate::authentication::UserId;
use crate::domain::Profile;
use crate::routes::error_chain_fmt;
use crate::store::{ProfileStore, StoreError};

// The JSON body a read endpoint answers with when it has nothing to show.
// Each endpoint keeps its own key and message.
#[derive(Debug, Clone, Copy)]
pub struct NotFoundReply {
    key: &'static str,
    message: &'static str,
}

const NO_PROFILE: NotFoundReply = NotFoundReply {
    key: "noprofile",
    message: "There is no profile for this user",
};

const NO_PROFILES: NotFoundReply = NotFoundReply {
    key: "noprofile",
    message: "There are no profile",
};

const NO_PROFILE_FOR_USER: NotFoundReply = NotFoundReply {
    key: "profile",
    message: "There is no profile for this user",
};

#[derive(thiserror::Error)]
pub enum LookupError {
    #[error("{}", .0.message)]
    NotFound(NotFoundReply),
    // Store failures are answered like a missing profile; only the logs differ.
    #[error("Failed to look up profiles.")]
    StoreFailure(NotFoundReply, #[source] anyhow::Error),
}

impl fmt::Debug for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LookupError {
    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    fn error_response(&self) -> HttpResponse {
        let reply = match self {
            LookupError::NotFound(reply) | LookupError::StoreFailure(reply, _) => reply,
        };
        let mut body = serde_json::Map::new();
        body.insert(reply.key.to_string(), reply.message.into());
        HttpResponse::NotFound().json(body)
    }
}

fn store_failure(reply: NotFoundReply) -> impl FnOnce(StoreError) -> LookupError {
    move |e| {
        let e = anyhow::Error::new(e);
        tracing::error!(error.cause_chain = ?e, "Profile lookup failed");
        LookupError::StoreFailure(reply, e)
    }
}

fn found(profile: Option<Profile>, reply: NotFoundReply) -> Result<HttpResponse, LookupError> {
    profile
        .map(|profile| HttpResponse::Ok().json(profile))
        .ok_or(LookupError::NotFound(reply))
}

/// Public smoke route for the profile API.
pub async fn profile_test() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "msg": "Profile works" }))
}

#[tracing::instrument(
    name = "Get current user's profile",
    skip(store, user_id),
    fields(user_id = tracing::field::Empty)
)]
pub async fn current_profile(
    store: web::Data<dyn ProfileStore>,
    user_id: web::ReqData<UserId>,
) -> Result<HttpResponse, LookupError> {
    let user_id = user_id.into_inner();
    tracing::Span::current().record("user_id", tracing::field::display(&user_id));

    let profile = store
        .find_by_owner(*user_id)
        .await
        .map_err(store_failure(NO_PROFILE))?;
    found(profile, NO_PROFILE)
}

#[tracing::instrument(name = "List all profiles", skip(store))]
pub async fn all_profiles(
    store: web::Data<dyn ProfileStore>,
) -> Result<HttpResponse, LookupError> {
    let profiles = store.list().await.map_err(store_failure(NO_PROFILES))?;
    Ok(HttpResponse::Ok().json(profiles))
}

#[tracing::instrument(name = "Get profile by handle", skip(store))]
pub async fn profile_by_handle(
    store: web::Data<dyn ProfileStore>,
    handle: web::Path<String>,
) -> Result<HttpResponse, LookupError> {
    let profile = store
        .find_by_handle(&handle)
        .await
        .map_err(store_failure(NO_PROFILE))?;
    found(profile, NO_PROFILE)
}

#[tracing::instrument(name = "Get profile by owner", skip(store))]
pub async fn profile_by_owner(
    store: web::Data<dyn ProfileStore>,
    owner_id: web::Path<String>,
) -> Result<HttpResponse, LookupError> {
    // A malformed id cannot own a profile.
    let Ok(owner_id) = Uuid::parse_str(&owner_id) else {
        return Err(LookupError::NotFound(NO_PROFILE_FOR_USER));
    };
    let profile = store
        .find_by_owner(owner_id)
        .await
        .map_err(store_failure(NO_PROFILE_FOR_USER))?;
    found(profile, NO_PROFILE_FOR_USER)
}
