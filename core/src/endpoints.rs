//! The HopTrip endpoint table.
//!
//! Every operation is one mapping from a method name to
//! (verb, path template, payload). [`intents`] holds the pure mappings for
//! hosts that run their own I/O; the `HopTripClient` methods below execute
//! them and decode the fields the service contract names.

use serde::Serialize;
use serde_json::Value;

use crate::client::HopTripClient;
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{AuthorTravelsPage, Created, TokenResponse};

/// Pure call intents, one per endpoint.
pub mod intents {
    use serde::Serialize;

    use crate::error::Result;
    use crate::intent::CallIntent;
    use crate::types::{
        AuthorTravelsPage, CategoryName, CommentText, EmailCredentials, FacebookCredentials,
        NewPassword,
    };

    pub fn register_user<U: Serialize + ?Sized>(user: &U) -> Result<CallIntent> {
        CallIntent::post("/user").json(user)
    }

    pub fn update_user<U: Serialize + ?Sized>(user: &U) -> Result<CallIntent> {
        CallIntent::put("/user").json(user)
    }

    pub fn token_by_email(email: &str, password: &str) -> Result<CallIntent> {
        CallIntent::post("/token").json(&EmailCredentials { email, password })
    }

    pub fn token_by_facebook(fb_token: &str) -> Result<CallIntent> {
        CallIntent::post("/token").json(&FacebookCredentials { fb_token })
    }

    pub fn confirm_email(email: &str) -> CallIntent {
        CallIntent::post("/email/confirm/%s").arg(email)
    }

    pub fn request_password_reset(email: &str) -> CallIntent {
        CallIntent::post("/password/link/%s").arg(email)
    }

    pub fn update_password(token: &str, password: &str) -> Result<CallIntent> {
        CallIntent::post("/password/reset/%s")
            .arg(token)
            .json(&NewPassword { password })
    }

    pub fn current_user() -> CallIntent {
        CallIntent::get("/user")
    }

    pub fn published_by_author(author_id: i64, page: AuthorTravelsPage) -> CallIntent {
        CallIntent::get("/user/%s/travels")
            .arg(author_id)
            .query("minimized", page.minimized)
            .query("limit", page.limit)
            .query("offset", page.offset)
    }

    pub fn cab_estimates(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> CallIntent {
        CallIntent::get("/cab/%s/%s/%s/%s")
            .arg(lat1)
            .arg(lon1)
            .arg(lat2)
            .arg(lon2)
    }

    pub fn start_hotel_search(location: i64, check_in: &str, check_out: &str, rooms: u32) -> CallIntent {
        CallIntent::post("/hotel/search/%s/%s/%s/%s")
            .arg(location)
            .arg(check_in)
            .arg(check_out)
            .arg(rooms)
    }

    pub fn hotel_search_results(search_id: i64, page: u32) -> CallIntent {
        CallIntent::get("/hotel/search-results/%s/%s")
            .arg(search_id)
            .arg(page)
    }

    pub fn create_travel<T: Serialize + ?Sized>(travel: &T) -> Result<CallIntent> {
        CallIntent::post("/travel").json(travel)
    }

    pub fn add_travel_comment(travel_id: i64, text: &str) -> Result<CallIntent> {
        CallIntent::post("/travel/%s/comment")
            .arg(travel_id)
            .json(&CommentText { text })
    }

    pub fn delete_travel_comment(comment_id: i64) -> CallIntent {
        CallIntent::delete("/travel/comment/%s").arg(comment_id)
    }

    pub fn travel_comments(travel_id: i64, limit: u32, offset: u32) -> CallIntent {
        CallIntent::get("/travel/%d/comments")
            .arg(travel_id)
            .query("limit", limit)
            .query("offset", offset)
    }

    pub fn create_category(name: &str) -> Result<CallIntent> {
        CallIntent::post("/category").json(&CategoryName { name })
    }

    pub fn travel_categories(name: Option<&str>) -> CallIntent {
        CallIntent::get("/travel/categories").query("name", name.filter(|n| !n.is_empty()))
    }

    pub fn travel(travel_id: i64) -> CallIntent {
        CallIntent::get("/travel/%s").arg(travel_id)
    }

    pub fn travels_by_category(name: &str) -> CallIntent {
        CallIntent::get("/travel/by-category/%s").arg(name)
    }

    pub fn my_travels() -> CallIntent {
        CallIntent::get("/travel/by-user")
    }

    pub fn update_travel<T: Serialize + ?Sized>(travel_id: i64, travel: &T) -> Result<CallIntent> {
        CallIntent::put("/travel/%s").arg(travel_id).json(travel)
    }

    pub fn delete_travel(travel_id: i64) -> CallIntent {
        CallIntent::delete("/travel/%s").arg(travel_id)
    }

    pub fn add_travel_to_favorites(travel_id: i64) -> CallIntent {
        CallIntent::post("/travel/%s/favorite").arg(travel_id)
    }

    pub fn remove_travel_from_favorites(travel_id: i64) -> CallIntent {
        CallIntent::delete("/travel/%s/favorite").arg(travel_id)
    }

    pub fn favorite_travels() -> CallIntent {
        CallIntent::get("/travel/favorite")
    }

    pub fn featured() -> CallIntent {
        CallIntent::get("/travel/featured")
    }

    pub fn register_booking<D: Serialize + ?Sized>(travel_id: i64, details: &D) -> Result<CallIntent> {
        CallIntent::post("/travel/%s/book").arg(travel_id).json(details)
    }

    pub fn stats() -> CallIntent {
        CallIntent::get("/stats")
    }

    pub fn upload_image(content: impl Into<Vec<u8>>) -> CallIntent {
        CallIntent::post("/image").raw(content)
    }
}

impl<T: Transport> HopTripClient<T> {
    pub fn register_user<U: Serialize + ?Sized>(&self, user: &U) -> Result<Value> {
        self.call(intents::register_user(user)?)
    }

    pub fn update_user<U: Serialize + ?Sized>(&self, user: &U) -> Result<Value> {
        self.call(intents::update_user(user)?)
    }

    /// Exchange e-mail credentials for a session token.
    ///
    /// The token is returned, not installed; pass it to `set_auth_token`.
    pub fn token_by_email(&self, email: &str, password: &str) -> Result<String> {
        let reply: TokenResponse = self.call_as(intents::token_by_email(email, password)?)?;
        Ok(reply.token)
    }

    pub fn token_by_facebook(&self, fb_token: &str) -> Result<String> {
        let reply: TokenResponse = self.call_as(intents::token_by_facebook(fb_token)?)?;
        Ok(reply.token)
    }

    pub fn confirm_email(&self, email: &str) -> Result<Value> {
        self.call(intents::confirm_email(email))
    }

    pub fn request_password_reset(&self, email: &str) -> Result<Value> {
        self.call(intents::request_password_reset(email))
    }

    pub fn update_password(&self, token: &str, password: &str) -> Result<Value> {
        self.call(intents::update_password(token, password)?)
    }

    pub fn current_user(&self) -> Result<Value> {
        self.call(intents::current_user())
    }

    pub fn published_by_author(&self, author_id: i64, page: AuthorTravelsPage) -> Result<Vec<Value>> {
        self.call_as(intents::published_by_author(author_id, page))
    }

    pub fn cab_estimates(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<Value> {
        self.call(intents::cab_estimates(lat1, lon1, lat2, lon2))
    }

    pub fn start_hotel_search(
        &self,
        location: i64,
        check_in: &str,
        check_out: &str,
        rooms: u32,
    ) -> Result<Value> {
        self.call(intents::start_hotel_search(location, check_in, check_out, rooms))
    }

    /// Results page of a hotel search. Pages start at 1.
    pub fn hotel_search_results(&self, search_id: i64, page: u32) -> Result<Value> {
        self.call(intents::hotel_search_results(search_id, page))
    }

    pub fn create_travel<V: Serialize + ?Sized>(&self, travel: &V) -> Result<i64> {
        let created: Created = self.call_as(intents::create_travel(travel)?)?;
        Ok(created.id)
    }

    pub fn add_travel_comment(&self, travel_id: i64, text: &str) -> Result<i64> {
        let created: Created = self.call_as(intents::add_travel_comment(travel_id, text)?)?;
        Ok(created.id)
    }

    pub fn delete_travel_comment(&self, comment_id: i64) -> Result<Value> {
        self.call(intents::delete_travel_comment(comment_id))
    }

    pub fn travel_comments(&self, travel_id: i64, limit: u32, offset: u32) -> Result<Vec<Value>> {
        self.call_as(intents::travel_comments(travel_id, limit, offset))
    }

    pub fn create_category(&self, name: &str) -> Result<i64> {
        let created: Created = self.call_as(intents::create_category(name)?)?;
        Ok(created.id)
    }

    /// All categories, or those matching `name`.
    pub fn travel_categories(&self, name: Option<&str>) -> Result<Value> {
        self.call(intents::travel_categories(name))
    }

    pub fn travel(&self, travel_id: i64) -> Result<Value> {
        self.call(intents::travel(travel_id))
    }

    pub fn travels_by_category(&self, name: &str) -> Result<Value> {
        self.call(intents::travels_by_category(name))
    }

    pub fn my_travels(&self) -> Result<Value> {
        self.call(intents::my_travels())
    }

    pub fn update_travel<V: Serialize + ?Sized>(&self, travel_id: i64, travel: &V) -> Result<Value> {
        self.call(intents::update_travel(travel_id, travel)?)
    }

    pub fn delete_travel(&self, travel_id: i64) -> Result<Value> {
        self.call(intents::delete_travel(travel_id))
    }

    pub fn add_travel_to_favorites(&self, travel_id: i64) -> Result<Value> {
        self.call(intents::add_travel_to_favorites(travel_id))
    }

    pub fn remove_travel_from_favorites(&self, travel_id: i64) -> Result<Value> {
        self.call(intents::remove_travel_from_favorites(travel_id))
    }

    pub fn favorite_travels(&self) -> Result<Value> {
        self.call(intents::favorite_travels())
    }

    pub fn featured(&self) -> Result<Value> {
        self.call(intents::featured())
    }

    pub fn register_booking<D: Serialize + ?Sized>(&self, travel_id: i64, details: &D) -> Result<Value> {
        self.call(intents::register_booking(travel_id, details)?)
    }

    pub fn stats(&self) -> Result<Value> {
        self.call(intents::stats())
    }

    pub fn upload_image(&self, content: impl Into<Vec<u8>>) -> Result<Value> {
        self.call(intents::upload_image(content))
    }
}
