//! Custom Axum extractors for form bodies
//!
//! `FormBody` reads a JSON body into a [`FormSubmission`] without rejecting
//! malformed input: a body that is not a JSON object behaves as if every
//! field were absent, and the schema reports the usual required-field errors.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;
use shared::FormSubmission;

use crate::error::ApiError;

pub struct FormBody(pub FormSubmission);

#[async_trait]
impl<S> FromRequest<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|err| {
            tracing::warn!(error = %err, "failed to read form body");
            ApiError::bad_request("InvalidRequest", "Failed to read request body")
        })?;

        if bytes.is_empty() {
            return Ok(FormBody(FormSubmission::new()));
        }

        let value = match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "form body is not valid JSON; treating as empty");
                Value::Null
            }
        };

        Ok(FormBody(FormSubmission::from_value(value)))
    }
}

impl std::ops::Deref for FormBody {
    type Target = FormSubmission;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
