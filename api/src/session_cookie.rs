//! Session identity carried in the `session_id` cookie

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
    response::Response,
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::metrics;

pub const SESSION_COOKIE: &str = "session_id";

/// The caller's session. A fresh one is issued when the request carries no
/// usable cookie; [`SessionId::attach`] then sets it on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    pub id: String,
    pub fresh: bool,
}

impl SessionId {
    pub fn issue(reason: &str) -> Self {
        metrics::SESSIONS_ISSUED.with_label_values(&[reason]).inc();
        Self {
            id: Uuid::new_v4().to_string(),
            fresh: true,
        }
    }

    pub fn attach(&self, mut response: Response) -> Response {
        if !self.fresh {
            return response;
        }
        let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}

/// Value of cookie `name` in a `Cookie` header.
pub fn cookie_value(raw: &str, name: &str) -> Option<String> {
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookie = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|raw| cookie_value(raw, SESSION_COOKIE));

        match cookie {
            Some(id) if Uuid::parse_str(&id).is_ok() => Ok(Self { id, fresh: false }),
            Some(_) => {
                tracing::debug!("ignoring malformed session cookie");
                Ok(Self::issue("invalid"))
            }
            None => Ok(Self::issue("missing")),
        }
    }
}
