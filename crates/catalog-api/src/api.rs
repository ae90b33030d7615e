use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

use crate::error::Error;
use crate::types::{DeleteProbe, ListQuery, LookupItem, LookupList, Page, Resource, SignInResponse};

/// The remote catalog boundary consumed by `catalog-core`.
///
/// [`CatalogClient`](crate::CatalogClient) is the HTTP implementation;
/// tests substitute in-memory fakes. Entity payloads are passed as raw
/// JSON so a single surface serves every resource.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Attach (or drop) the bearer credential used by every subsequent call.
    fn set_token(&self, token: Option<SecretString>);

    /// Whether a bearer credential is currently attached.
    fn has_token(&self) -> bool;

    async fn sign_in(&self, username: &str, password: &SecretString)
    -> Result<SignInResponse, Error>;

    async fn sign_out(&self) -> Result<(), Error>;

    async fn list(&self, resource: Resource, query: &ListQuery) -> Result<Page<Value>, Error>;

    async fn create(&self, resource: Resource, payload: &Value) -> Result<Value, Error>;

    async fn update(&self, resource: Resource, id: i64, payload: &Value) -> Result<Value, Error>;

    async fn delete(&self, resource: Resource, id: i64) -> Result<(), Error>;

    /// Ask the server whether `id` can be deleted without breaking references.
    async fn probe_delete(&self, resource: Resource, id: i64) -> Result<DeleteProbe, Error>;

    /// Add (`member = true`) or remove an entity from a membership collection.
    async fn set_membership(&self, resource: Resource, id: i64, member: bool)
    -> Result<(), Error>;

    async fn lookups(&self, list: LookupList) -> Result<Vec<LookupItem>, Error>;
}
