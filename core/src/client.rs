//! Client for the HopTrip API.
//!
//! # Design
//! `HopTripClient` wires the pure pieces together: the [`RequestBuilder`]
//! produces an `HttpRequest`, the [`Transport`] executes it, and
//! [`resolve`] classifies the response. The only state carried between
//! calls is the [`AuthContext`], replaced through [`set_auth_token`]
//! and snapshotted at the start of every call so a concurrent update never
//! affects a request already in flight.
//!
//! [`set_auth_token`]: HopTripClient::set_auth_token

use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug_span;

use crate::auth::AuthContext;
use crate::builder::RequestBuilder;
use crate::error::{Error, Result};
use crate::intent::CallIntent;
use crate::resolver::{decode, resolve};
use crate::transport::Transport;

/// Typed client over a pluggable transport.
#[derive(Debug)]
pub struct HopTripClient<T> {
    builder: RequestBuilder,
    transport: T,
    auth: RwLock<AuthContext>,
}

#[cfg(feature = "ureq")]
impl HopTripClient<crate::transport::UreqTransport> {
    /// Client backed by a blocking `ureq` agent.
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        Self::new(
            &config.base_url,
            crate::transport::UreqTransport::new(config.timeout),
        )
    }
}

impl<T: Transport> HopTripClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            builder: RequestBuilder::new(base_url),
            transport,
            auth: RwLock::new(AuthContext::default()),
        }
    }

    pub fn base_url(&self) -> &str {
        self.builder.base_url()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Replace the session token. `None` makes later calls anonymous.
    pub fn set_auth_token<S: Into<String>>(&self, token: Option<S>) {
        let mut guard = self.auth.write().unwrap_or_else(PoisonError::into_inner);
        *guard = AuthContext::new(token.map(Into::into));
    }

    /// Copy of the Auth Context as it is right now.
    pub fn auth(&self) -> AuthContext {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one call through build, transport and resolve.
    pub fn call(&self, intent: CallIntent) -> Result<Value> {
        let span = debug_span!("call", method = %intent.method, template = intent.template);
        let _enter = span.enter();

        let auth = self.auth();
        let request = self.builder.build(&intent, &auth)?;
        let response = self.transport.execute(&request).map_err(Error::Transport)?;
        resolve(&response)
    }

    /// [`call`](Self::call) followed by a typed decode of the result.
    pub fn call_as<R: DeserializeOwned>(&self, intent: CallIntent) -> Result<R> {
        decode(self.call(intent)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Barrier, Mutex};

    use serde_json::json;

    use super::*;
    use crate::error::{ApiError, TransportFailure};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, AUTHORIZATION};

    /// Replays canned responses and records every request it sees.
    struct Recorder {
        responses: Mutex<Vec<std::result::Result<HttpResponse, TransportFailure>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Recorder {
        fn new(responses: Vec<std::result::Result<HttpResponse, TransportFailure>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for Recorder {
        fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportFailure> {
            self.seen.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .expect("no canned response left")
        }
    }

    fn client(responses: Vec<std::result::Result<HttpResponse, TransportFailure>>) -> HopTripClient<Recorder> {
        HopTripClient::new("https://api.hoptrip.test", Recorder::new(responses))
    }

    #[test]
    fn call_returns_decoded_value() {
        let c = client(vec![Ok(HttpResponse::new(200, r#"{"token":"yo"}"#))]);
        let value = c.call(CallIntent::post("/token")).unwrap();
        assert_eq!(value, json!({"token": "yo"}));

        let req = c.transport().last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://api.hoptrip.test/token");
    }

    #[test]
    fn token_is_sent_after_it_is_set() {
        let c = client(vec![
            Ok(HttpResponse::new(200, "{}")),
            Ok(HttpResponse::new(200, "{}")),
            Ok(HttpResponse::new(200, "{}")),
        ]);

        c.call(CallIntent::get("/user")).unwrap();
        assert_eq!(c.transport().last().header(AUTHORIZATION), None);

        c.set_auth_token(Some("mytoken"));
        c.call(CallIntent::get("/user")).unwrap();
        assert_eq!(c.transport().last().header(AUTHORIZATION), Some("Token mytoken"));

        c.set_auth_token(None::<String>);
        c.call(CallIntent::get("/user")).unwrap();
        assert_eq!(c.transport().last().header(AUTHORIZATION), None);
    }

    #[test]
    fn empty_token_sends_no_header() {
        let c = client(vec![Ok(HttpResponse::new(200, "{}"))]);
        c.set_auth_token(Some(""));
        c.call(CallIntent::get("/user")).unwrap();
        assert_eq!(c.transport().last().header(AUTHORIZATION), None);
        assert!(!c.auth().is_authenticated());
    }

    #[test]
    fn api_error_propagates() {
        let c = client(vec![Ok(HttpResponse::new(401, r#"{"error":"omg","code":42}"#))]);
        let err = c.call(CallIntent::get("/user")).unwrap_err();
        assert_eq!(err, Error::Api(ApiError::new("omg", 42)));
    }

    #[test]
    fn transport_failure_propagates_without_resolving() {
        let c = client(vec![Err(TransportFailure::Connection("refused".to_string()))]);
        let err = c.call(CallIntent::get("/user")).unwrap_err();
        assert_eq!(
            err,
            Error::Transport(TransportFailure::Connection("refused".to_string()))
        );
    }

    #[test]
    fn invalid_intent_never_reaches_transport() {
        let c = client(Vec::new());
        let err = c.call(CallIntent::get("/travel/%s")).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(c.transport().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn call_as_decodes_typed_result() {
        #[derive(serde::Deserialize)]
        struct Created {
            id: i64,
        }

        let c = client(vec![Ok(HttpResponse::new(200, r#"{"id":9}"#))]);
        let created: Created = c.call_as(CallIntent::post("/travel")).unwrap();
        assert_eq!(created.id, 9);
    }

    /// Parks the request until the test releases it, then echoes its auth header.
    struct Gate {
        entered: Barrier,
        release: Barrier,
    }

    impl Transport for Gate {
        fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportFailure> {
            self.entered.wait();
            self.release.wait();
            let header = request.header(AUTHORIZATION).unwrap_or_default();
            Ok(HttpResponse::new(200, json!({ "auth": header }).to_string()))
        }
    }

    #[test]
    fn in_flight_call_keeps_token_snapshot() {
        let client = HopTripClient::new(
            "http://localhost",
            Gate {
                entered: Barrier::new(2),
                release: Barrier::new(2),
            },
        );
        client.set_auth_token(Some("old"));

        std::thread::scope(|s| {
            let in_flight = s.spawn(|| client.call(CallIntent::get("/user")));
            client.transport().entered.wait();
            client.set_auth_token(Some("new"));
            client.transport().release.wait();

            let value = in_flight.join().unwrap().unwrap();
            assert_eq!(value["auth"], "Token old");
        });
        assert_eq!(client.auth().token(), Some("new"));
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<HopTripClient<Recorder>>();
    }
}
