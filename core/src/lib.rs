//! Typed client core for the HopTrip REST API.
//!
//! # Overview
//! A call flows through three stages:
//!
//! 1. [`RequestBuilder`] turns a [`CallIntent`] and the [`AuthContext`] into
//!    an [`HttpRequest`]. Pure, no I/O.
//! 2. A [`Transport`] executes it and returns an [`HttpResponse`].
//! 3. [`resolve`] classifies the response into a JSON value, an
//!    [`ApiError`], or a [`TransportFailure`]. Pure, no I/O.
//!
//! # Design
//! - [`HopTripClient`] owns the builder, the transport and the Auth Context.
//!   The token is the only state shared between calls.
//! - Endpoint methods are thin wrappers over [`endpoints::intents`]; hosts
//!   that perform their own I/O can use the intents, builder and resolver
//!   directly.
//! - Bodies are bytes; UTF-8 decoding is an explicit step in the resolver.

pub mod auth;
pub mod builder;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod intent;
pub mod resolver;
pub mod transport;
pub mod types;

pub use auth::AuthContext;
pub use builder::RequestBuilder;
pub use client::HopTripClient;
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result, TransportFailure};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use intent::{Body, CallIntent, PathArg, QueryValue};
pub use resolver::{decode, resolve};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{AuthorTravelsPage, Created, TokenResponse};
