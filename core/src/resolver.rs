//! Response Resolver: classifies an [`HttpResponse`] into a value or an error.
//!
//! # Design
//! Ordered rules, first match wins:
//!
//! 1. 2xx: the body is decoded as UTF-8 JSON and returned untyped. An empty
//!    body resolves to `Value::Null`. Anything undecodable is a
//!    [`TransportFailure::MalformedBody`], never a silent empty result.
//! 2. Non-2xx carrying `{"error": string, "code": integer}`: [`ApiError`].
//! 3. Any other non-2xx: [`TransportFailure::Status`] with the raw context.
//!
//! The resolver is a pure function of the response; resolving the same
//! response twice yields equal outcomes.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, Error, Result, TransportFailure};
use crate::http::HttpResponse;

/// Decode a transport response into an untyped JSON value.
pub fn resolve(response: &HttpResponse) -> Result<Value> {
    if response.is_success() {
        let value = decode_success(response)?;
        debug!(status = response.status, "resolved response");
        return Ok(value);
    }

    if let Some(api_error) = structured_error(&response.body) {
        warn!(
            status = response.status,
            code = api_error.code,
            message = %api_error.message,
            "service rejected request"
        );
        return Err(api_error.into());
    }

    warn!(status = response.status, "unexpected response status");
    Err(TransportFailure::Status {
        status: response.status,
        headers: response.headers.clone(),
        body: String::from_utf8_lossy(&response.body).into_owned(),
    }
    .into())
}

/// Convert an untyped value into the shape an endpoint expects.
///
/// Mismatches report the JSON path of the offending field.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        Error::Transport(TransportFailure::UnexpectedShape {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        })
    })
}

fn decode_success(response: &HttpResponse) -> Result<Value> {
    let malformed = |reason: String| {
        Error::Transport(TransportFailure::MalformedBody {
            status: response.status,
            headers: response.headers.clone(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
            reason,
        })
    };

    let text = std::str::from_utf8(&response.body)
        .map_err(|e| malformed(format!("body is not valid UTF-8: {e}")))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| malformed(format!("body is not valid JSON: {e}")))
}

/// The service's `{"error", "code"}` shape, if the body carries it.
fn structured_error(body: &[u8]) -> Option<ApiError> {
    let text = std::str::from_utf8(body).ok()?;
    let value: Value = serde_json::from_str(text).ok()?;
    let message = value.get("error")?.as_str()?;
    let code = value.get("code")?.as_i64()?;
    Some(ApiError::new(message, code))
}
