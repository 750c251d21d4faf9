//! Payload and result DTOs for the HopTrip endpoints.
//!
//! # Design
//! Only the fields the client itself relies on are typed here. Travel, user
//! and booking documents are passed through as caller-provided `Serialize`
//! values or returned as untyped JSON.

use serde::{Deserialize, Serialize};

/// `POST /token` body for e-mail login.
#[derive(Debug, Clone, Serialize)]
pub struct EmailCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /token` body for Facebook login.
#[derive(Debug, Clone, Serialize)]
pub struct FacebookCredentials<'a> {
    #[serde(rename = "fbToken")]
    pub fb_token: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPassword<'a> {
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentText<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryName<'a> {
    pub name: &'a str,
}

/// Session token issued by `POST /token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Identifier of a freshly created resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Created {
    pub id: i64,
}

/// Paging for an author's published travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorTravelsPage {
    /// Ask the server for the short form of each travel.
    pub minimized: bool,
    pub limit: u32,
    pub offset: u32,
}

impl Default for AuthorTravelsPage {
    fn default() -> Self {
        Self {
            minimized: true,
            limit: 10,
            offset: 0,
        }
    }
}
