//! Generic CRUD client for a REST collection.
//!
//! Every operation follows the same pipeline: validate inputs (no request is
//! sent if they are bad), issue one HTTP call, schema-check the decoded body,
//! deserialize it. The whole pipeline runs inside [`safe_request`], so each
//! method resolves to an [`ApiResult`] and nothing escapes as a panic or a
//! foreign error.

use crate::api_error::ApiError;
use crate::executor::{safe_request, Failure};
use crate::metadata::RequestMetadata;
use crate::result::ApiResult;
use crate::schema::{IssueCode, Schema, SchemaError, ValidationIssue};
use crate::validate::{check_id, check_schema_named, IdLike};
use crate::Client;
use http::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// An entity exposed as a REST collection.
pub trait Resource: DeserializeOwned + Send {
    /// Payload accepted by [`ResourceClient::create`].
    type New: Serialize + Sync;

    /// Payload accepted by [`ResourceClient::update`].
    type Patch: Serialize + Sync;

    /// Collection path segment, e.g. `"users"`.
    const COLLECTION: &'static str;

    /// Singular name used in validation messages, e.g. `"user"`.
    const NAME: &'static str;

    /// Field holding the server-assigned identity.
    const ID_FIELD: &'static str = "id";

    /// Full schema of the entity as returned by the server.
    fn schema() -> Schema;

    /// Validates a `find_by` filter before it is sent.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if `value` is not acceptable for `field`.
    fn check_filter(_field: &str, _value: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// CRUD operations over one [`Resource`] collection.
///
/// Holds only a cloned [`Client`]; calls share no mutable state and may run
/// concurrently.
pub struct ResourceClient<R> {
    client: Client,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceClient<R> {
    /// Creates a resource client on top of `client`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// The underlying transport.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn item_path(id: u64) -> String {
        format!("{}/{}", R::COLLECTION, id)
    }

    async fn send(
        &self,
        metadata: RequestMetadata,
        body: Option<&Value>,
    ) -> Result<Value, Failure> {
        let response = self.client.call::<Value, Value>(metadata, body).await?;
        tracing::debug!(
            resource = R::COLLECTION,
            status = response.status.as_u16(),
            latency_ms = response.latency.as_millis(),
            "Resource call completed"
        );
        Ok(response.into_data())
    }

    /// Schema-checks `body`, then deserializes it. A body the schema accepts
    /// but the typed model rejects (e.g. an integer sent as `1.0`) is still a
    /// shape mismatch.
    fn decode<T: DeserializeOwned>(schema: &Schema, body: Value) -> Result<T, Failure> {
        schema.validate(&body)?;
        serde_json::from_value(body).map_err(|err| {
            Failure::Schema(SchemaError {
                issues: vec![ValidationIssue::root(
                    IssueCode::InvalidType,
                    err.to_string(),
                )],
            })
        })
    }

    fn encode(payload: &impl Serialize, schema: &Schema) -> Result<Value, Failure> {
        let body = serde_json::to_value(payload)?;
        check_schema_named(&body, schema, R::NAME)?;
        Ok(body)
    }

    /// Fetches the whole collection.
    pub async fn list(&self) -> ApiResult<Vec<R>> {
        safe_request(|| async move {
            let body = self
                .send(RequestMetadata::new(Method::GET, R::COLLECTION), None)
                .await?;
            Self::decode(&Schema::array(R::schema()), body)
        })
        .await
    }

    /// Fetches one entity. A missing entity resolves to a `NOT_FOUND` failure.
    pub async fn get(&self, id: impl IdLike) -> ApiResult<R> {
        safe_request(|| async move {
            let id = check_id(id)?;
            let body = self
                .send(RequestMetadata::new(Method::GET, Self::item_path(id)), None)
                .await?;
            Self::decode(&R::schema(), body)
        })
        .await
    }

    /// Fetches every entity whose `field` equals `value`.
    ///
    /// No match is a success with an empty list.
    pub async fn find_by(&self, field: &str, value: &str) -> ApiResult<Vec<R>> {
        safe_request(|| async move {
            R::check_filter(field, value)?;
            let metadata = RequestMetadata::new(Method::GET, R::COLLECTION)
                .with_query_param(field, value);
            let body = self.send(metadata, None).await?;
            Self::decode(&Schema::array(R::schema()), body)
        })
        .await
    }

    /// Creates an entity. The payload is checked against the schema without
    /// the identity field; the server's reply, including its assigned id, is
    /// checked against the full schema.
    pub async fn create(&self, payload: &R::New) -> ApiResult<R> {
        safe_request(|| async move {
            let schema = R::schema();
            let body = Self::encode(payload, &schema.omit(R::ID_FIELD))?;
            let reply = self
                .send(RequestMetadata::new(Method::POST, R::COLLECTION), Some(&body))
                .await?;
            Self::decode(&schema, reply)
        })
        .await
    }

    /// Updates an entity. Every patch field is optional but present fields
    /// must match their type; an empty patch is valid.
    pub async fn update(&self, id: impl IdLike, patch: &R::Patch) -> ApiResult<R> {
        safe_request(|| async move {
            let id = check_id(id)?;
            let schema = R::schema();
            let body = Self::encode(patch, &schema.partial())?;
            let reply = self
                .send(
                    RequestMetadata::new(Method::PUT, Self::item_path(id)),
                    Some(&body),
                )
                .await?;
            Self::decode(&schema, reply)
        })
        .await
    }

    /// Deletes an entity. Success carries no value.
    pub async fn delete(&self, id: impl IdLike) -> ApiResult<()> {
        safe_request(|| async move {
            let id = check_id(id)?;
            let metadata = RequestMetadata::new(Method::DELETE, Self::item_path(id));
            let response = self.client.call_raw::<Value>(metadata, None).await?;
            tracing::debug!(
                resource = R::COLLECTION,
                status = response.status.as_u16(),
                "Resource deleted"
            );
            Ok::<_, Failure>(())
        })
        .await
    }
}
