//! # Safecall - typed REST resource clients that never throw
//!
//! Safecall wraps a `reqwest`-based transport with input validation, response
//! schema checks and a single error taxonomy. Every resource operation
//! resolves to an [`ApiResult`]; failures of every kind, from a malformed id
//! to a dropped connection, arrive as an [`ApiError`] with a stable
//! [`ErrorCode`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use safecall::{users, Client, ErrorCode};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), safecall::Error> {
//!     let client = Client::builder()
//!         .base_url("https://jsonplaceholder.typicode.com")?
//!         .timeout(Duration::from_secs(10))
//!         .build()?;
//!     let users = users::users(client);
//!
//!     match users.get(1).await {
//!         Ok(user) => println!("User: {}", user.name),
//!         Err(err) if err.has_code(&ErrorCode::NotFound) => println!("No such user"),
//!         Err(err) => eprintln!("Failed ({}): {}", err.status(), err),
//!     }
//!
//!     // Rejected locally: no request is sent.
//!     let err = users.delete(0).await.unwrap_err();
//!     assert_eq!(err.code(), Some(&ErrorCode::InvalidId));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error taxonomy
//!
//! | code | status | origin |
//! |---|---|---|
//! | `INVALID_ID`, `INVALID_EMAIL` | 400 | input validators |
//! | `VALIDATION_ERROR` | 422 | payload or response schema |
//! | `BAD_REQUEST`, `UNAUTHORIZED`, `FORBIDDEN`, `NOT_FOUND`, `REQUEST_TIMEOUT`, `INTERNAL_SERVER_ERROR` | mirrors the code | transport |
//! | `HTTP_ERROR` | the response status | transport, other statuses |
//! | `FETCH_ERROR` | 0 | no response |
//! | `UNKNOWN_ERROR` | 0 | anything else |
//!
//! ## Wire shape
//!
//! [`ResultTuple`] serializes a result as `[ok, data, error]`, the positional
//! form UI code destructures.

mod api_error;
mod client;
mod error;
pub mod executor;
pub mod metadata;
pub mod resolve;
pub mod resource;
mod response;
mod result;
pub mod schema;
pub mod users;
pub mod validate;

pub use api_error::{ApiError, CustomCode, ErrorCode, ErrorDetails, ErrorRecord, ERROR_NAME};
pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use executor::{safe_request, Failure, StatusFault};
pub use resource::{Resource, ResourceClient};
pub use response::Response;
pub use result::{fail, ok, ApiResult, ResultTuple};
pub use schema::{Schema, SchemaError, ValidationIssue};
pub use validate::{check_email, check_id, check_schema, check_schema_named};
