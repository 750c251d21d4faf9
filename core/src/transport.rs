//! HTTP transport collaborator.
//!
//! The pipeline never performs I/O itself: a [`Transport`] executes the
//! built [`HttpRequest`] and hands back the raw [`HttpResponse`]. Network
//! level problems surface as [`TransportFailure`] without a body to inspect.

use crate::error::TransportFailure;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one request and returns the response as data.
///
/// Implementations must return non-2xx responses as `Ok`: classifying them is
/// the resolver's job.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::{UreqTransport, DEFAULT_BODY_LIMIT};

#[cfg(feature = "ureq")]
mod blocking {
    use std::time::Duration;

    use tracing::{debug, warn};

    use super::Transport;
    use crate::error::TransportFailure;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Response bodies larger than this are rejected unless overridden.
    pub const DEFAULT_BODY_LIMIT: u64 = 64 * 1024 * 1024;

    /// Blocking transport backed by a `ureq` agent.
    ///
    /// Status codes are never turned into errors by the agent. A non-empty
    /// body is sent for every verb, GET and DELETE included.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
        body_limit: u64,
    }

    impl UreqTransport {
        pub fn new(timeout: Duration) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent();
            Self {
                agent,
                body_limit: DEFAULT_BODY_LIMIT,
            }
        }

        /// Cap on the response body size, in bytes.
        pub fn with_body_limit(mut self, limit: u64) -> Self {
            self.body_limit = limit;
            self
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new(crate::config::DEFAULT_TIMEOUT)
        }
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn map_error(err: ureq::Error) -> TransportFailure {
        match err {
            ureq::Error::Timeout(_) => TransportFailure::Timeout(err.to_string()),
            other => TransportFailure::Connection(other.to_string()),
        }
    }

    fn without_body(
        builder: ureq::RequestBuilder<ureq::typestate::WithoutBody>,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        if body.is_empty() {
            with_headers(builder, headers).call()
        } else {
            with_headers(builder.force_send_body(), headers).send(body)
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
            let url = request.url.as_str();
            let headers = &request.headers;
            let body = request.body.as_slice();

            let result = match request.method {
                HttpMethod::Get => without_body(self.agent.get(url), headers, body),
                HttpMethod::Delete => without_body(self.agent.delete(url), headers, body),
                HttpMethod::Post => with_headers(self.agent.post(url), headers).send(body),
                HttpMethod::Put => with_headers(self.agent.put(url), headers).send(body),
            };
            let mut response = result.map_err(map_error)?;

            let status = response.status().as_u16();
            let headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = match response
                .body_mut()
                .with_config()
                .limit(self.body_limit)
                .read_to_vec()
            {
                Ok(body) => body,
                Err(ureq::Error::BodyExceedsLimit(limit)) => {
                    warn!(status, limit, "response body exceeds limit");
                    return Err(TransportFailure::MalformedBody {
                        status,
                        headers,
                        body: String::new(),
                        reason: format!("body exceeds {limit} bytes"),
                    });
                }
                Err(err) => return Err(map_error(err)),
            };

            debug!(status, body_len = body.len(), "transport round-trip complete");
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
