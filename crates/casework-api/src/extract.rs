//! Request extractors.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequest, Request};
use axum::http::request::Parts;
use casework_core::error::DomainError;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the id of the user making the request.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user making the request, if the caller identified one.
///
/// Authentication happens upstream; this only reads the id it forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub Option<Uuid>);

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Self(None));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(|id| Self(Some(id)))
            .ok_or_else(|| {
                ApiError(DomainError::Validation(format!(
                    "{USER_ID_HEADER} header must be a UUID"
                )))
            })
    }
}

/// JSON request body whose rejections are `validation_error` responses.
///
/// As `Option<ApiJson<T>>` a request without a `Content-Type` header yields
/// `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[allow(clippy::needless_pass_by_value)]
fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError(DomainError::Validation(rejection.body_text()))
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(invalid_body)?;
        Ok(Self(value))
    }
}

impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let body = <Json<T> as OptionalFromRequest<S>>::from_request(req, state)
            .await
            .map_err(invalid_body)?;
        Ok(body.map(|Json(value)| Self(value)))
    }
}
