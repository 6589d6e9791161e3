/**
 * Client Id Extractor
 *
 * Reads the `X-Client-Id` header that clients send with mutations. Events a
 * handler publishes are tagged with it, so the relay can skip the tab that
 * caused them. A missing or empty header yields `ClientId(None)`.
 */

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::shared::event::CLIENT_ID_HEADER;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientId(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(ClientId(id))
    }
}
