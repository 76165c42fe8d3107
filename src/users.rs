//! The users resource.
//!
//! # Examples
//!
//! ```no_run
//! use safecall::{users, Client};
//!
//! # async fn example() -> Result<(), safecall::Error> {
//! let client = Client::builder()
//!     .base_url("https://jsonplaceholder.typicode.com")?
//!     .build()?;
//! let users = users::users(client);
//!
//! match users.get(1).await {
//!     Ok(user) => println!("{} <{}>", user.name, user.email),
//!     Err(err) => eprintln!("{}: {}", err.code().map_or("-", |c| c.as_str()), err),
//! }
//! # Ok(())
//! # }
//! ```

use crate::api_error::ApiError;
use crate::resource::{Resource, ResourceClient};
use crate::result::ApiResult;
use crate::schema::{Schema, EMAIL_PATTERN};
use crate::validate::check_email;
use crate::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Geographic coordinates, as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    /// Latitude in decimal degrees.
    pub lat: String,
    /// Longitude in decimal degrees.
    pub lng: String,
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Street name.
    pub street: String,
    /// Apartment or suite.
    pub suite: String,
    /// City name.
    pub city: String,
    /// Postal code.
    pub zipcode: String,
    /// Coordinates of the address.
    pub geo: Geo,
}

/// The company a user works for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Company name.
    pub name: String,
    /// Marketing slogan, `catchPhrase` on the wire.
    pub catch_phrase: String,
    /// Business description.
    pub bs: String,
}

/// A user as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier, always positive.
    pub id: u64,
    /// Display name; never empty.
    pub name: String,
    /// Login handle; never empty.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Postal address.
    pub address: Address,
    /// Free-form phone number.
    pub phone: String,
    /// Personal website, without scheme.
    pub website: String,
    /// Employer.
    pub company: Company,
}

/// Payload for creating a user; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name; must not be empty.
    pub name: String,
    /// Login handle; must not be empty.
    pub username: String,
    /// Contact email address; must be well formed.
    pub email: String,
    /// Postal address.
    pub address: Address,
    /// Free-form phone number.
    pub phone: String,
    /// Personal website, without scheme.
    pub website: String,
    /// Employer.
    pub company: Company,
}

/// Partial update for a user. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

impl Resource for User {
    type New = NewUser;
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";
    const NAME: &'static str = "user";

    fn schema() -> Schema {
        let string = json!({ "type": "string" });
        let geo = json!({
            "type": "object",
            "required": ["lat", "lng"],
            "properties": { "lat": string, "lng": string }
        });
        let address = json!({
            "type": "object",
            "required": ["street", "suite", "city", "zipcode", "geo"],
            "properties": {
                "street": string,
                "suite": string,
                "city": string,
                "zipcode": string,
                "geo": geo
            }
        });
        let company = json!({
            "type": "object",
            "required": ["name", "catchPhrase", "bs"],
            "properties": { "name": string, "catchPhrase": string, "bs": string }
        });

        Schema::new(json!({
            "type": "object",
            "required": ["id", "name", "username", "email", "address", "phone", "website", "company"],
            "properties": {
                "id": { "type": "integer", "minimum": 1 },
                "name": { "type": "string", "minLength": 1 },
                "username": { "type": "string", "minLength": 1 },
                "email": { "type": "string", "pattern": EMAIL_PATTERN },
                "address": address,
                "phone": string,
                "website": string,
                "company": company
            }
        }))
    }

    fn check_filter(field: &str, value: &str) -> Result<(), ApiError> {
        match field {
            "email" => check_email(value),
            _ => Ok(()),
        }
    }
}

/// Creates a users client on top of `client`.
pub fn users(client: Client) -> ResourceClient<User> {
    ResourceClient::new(client)
}

impl ResourceClient<User> {
    /// Fetches users by email address, validating the address first.
    pub async fn find_by_email(&self, email: &str) -> ApiResult<Vec<User>> {
        self.find_by("email", email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_error::ErrorCode;

    fn sample() -> serde_json::Value {
        json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": { "lat": "-37.3159", "lng": "81.1496" }
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {
                "name": "Romaguera-Crona",
                "catchPhrase": "Multi-layered client-server neural-net",
                "bs": "harness real-time e-markets"
            }
        })
    }

    #[test]
    fn test_schema_accepts_server_shape() {
        let value = sample();
        assert!(User::schema().validate(&value).is_ok());

        let user: User = serde_json::from_value(value).unwrap();
        assert_eq!(user.company.catch_phrase, "Multi-layered client-server neural-net");
    }

    #[test]
    fn test_new_user_matches_schema_without_id() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("id");
        let new_user: NewUser = serde_json::from_value(value).unwrap();

        let body = serde_json::to_value(&new_user).unwrap();
        assert!(User::schema().validate(&body).is_err());
        assert!(User::schema().omit(User::ID_FIELD).validate(&body).is_ok());
    }

    #[test]
    fn test_empty_patch_serializes_to_empty_object() {
        let body = serde_json::to_value(UserPatch::default()).unwrap();
        assert_eq!(body, json!({}));
        assert!(User::schema().partial().validate(&body).is_ok());
    }

    #[test]
    fn test_filter_checks_emails_only() {
        assert!(User::check_filter("username", "anything goes").is_ok());
        assert!(User::check_filter("email", "a@b.io").is_ok());

        let err = User::check_filter("email", "nope").unwrap_err();
        assert_eq!(err.code(), Some(&ErrorCode::InvalidEmail));
    }
}
