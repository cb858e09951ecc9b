use crate::SharedData;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};
use std::convert::Infallible;
use std::sync::Arc;

/// The username an upstream identity layer authenticated for this request, if any.
/// Credentials are never checked here; the identity layer is trusted to strip the
/// header from requests it did not authenticate.
#[derive(Debug, PartialEq, Eq)]
pub struct Principal(Option<String>);

impl Principal {
    pub fn username(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Reads the principal from the configured header. Blank or non-UTF-8 values count
    /// as no principal.
    pub fn from_headers(headers: &HeaderMap, header_name: &HeaderName) -> Principal {
        let username = headers
            .get(header_name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|username| !username.is_empty())
            .map(str::to_owned);

        Principal(username)
    }
}

#[async_trait]
impl FromRequestParts<Arc<SharedData>> for Principal {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<SharedData>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Principal::from_headers(&parts.headers, &state.auth_user_header))
    }
}
