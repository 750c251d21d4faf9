//! Request Builder: turns a [`CallIntent`] into an [`HttpRequest`].
//!
//! # Design
//! Pure, no I/O. Path templates use positional `%s` / `%d` placeholders
//! (`%%` is a literal percent sign). Each argument is percent-encoded on its
//! own so values containing `/`, `@` or spaces cannot change the shape of the
//! path. Query pairs keep insertion order and are form-encoded.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;
use url::form_urlencoded;

use crate::auth::AuthContext;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, APPLICATION_JSON, CONTENT_TYPE};
use crate::intent::{Body, CallIntent, PathArg};

/// Everything outside the RFC 3986 unreserved set is encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builds transport-ready requests against a fixed base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
}

impl RequestBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Assemble method, URL, headers and body for one call.
    ///
    /// Fails only when the inputs are malformed: placeholder/argument arity
    /// mismatch, an unknown placeholder, a payload that cannot be serialized,
    /// or a token that cannot travel in a header.
    pub fn build(&self, intent: &CallIntent, auth: &AuthContext) -> Result<HttpRequest> {
        let mut url = self.base_url.clone();
        url.push_str(&expand_path(intent.template, &intent.path_args)?);

        if let Some(query) = encode_query(intent) {
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = Vec::new();
        let body = match &intent.body {
            Body::Empty => Vec::new(),
            Body::Json(value) => {
                headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
                serde_json::to_vec(value)
                    .map_err(|e| Error::InvalidRequest(format!("payload is not serializable: {e}")))?
            }
            Body::Raw(bytes) => bytes.clone(),
        };

        if let Some((name, value)) = auth.header() {
            if value.chars().any(|c| c.is_ascii_control() && c != '\t') {
                return Err(Error::InvalidRequest(
                    "auth token contains control characters".to_string(),
                ));
            }
            headers.push((name, value));
        }

        debug!(
            method = %intent.method,
            url = %url,
            body_len = body.len(),
            authenticated = auth.is_authenticated(),
            "built request"
        );

        Ok(HttpRequest {
            method: intent.method,
            url,
            headers,
            body,
        })
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder,
}

fn parse_template(template: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        if pos > 0 {
            segments.push(Segment::Literal(&rest[..pos]));
        }
        let tail = &rest[pos + 1..];
        match tail.as_bytes().first() {
            Some(b's' | b'd') => segments.push(Segment::Placeholder),
            Some(b'%') => segments.push(Segment::Literal("%")),
            _ => {
                return Err(Error::InvalidRequest(format!(
                    "unsupported placeholder in path template '{template}'"
                )))
            }
        }
        rest = &tail[1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    Ok(segments)
}

/// Fill the template positionally with percent-encoded arguments.
pub fn expand_path(template: &str, args: &[PathArg]) -> Result<String> {
    let segments = parse_template(template)?;
    let expected = segments
        .iter()
        .filter(|s| matches!(s, Segment::Placeholder))
        .count();
    if expected != args.len() {
        return Err(Error::InvalidRequest(format!(
            "path template '{template}' expects {expected} argument(s), got {}",
            args.len()
        )));
    }

    let mut args = args.iter();
    let mut path = String::with_capacity(template.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => path.push_str(text),
            Segment::Placeholder => {
                if let Some(arg) = args.next() {
                    path.extend(utf8_percent_encode(&arg.to_string(), PATH_SEGMENT));
                }
            }
        }
    }
    Ok(path)
}

/// Form-encode the present query pairs, `None` when nothing remains.
fn encode_query(intent: &CallIntent) -> Option<String> {
    let pairs: Vec<(&str, String)> = intent
        .query
        .iter()
        .filter_map(|(name, value)| value.encode().map(|v| (name.as_str(), v)))
        .collect();
    if pairs.is_empty() {
        return None;
    }
    Some(
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish(),
    )
}
