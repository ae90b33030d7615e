// Async HTTP client for the catalog REST API.
//
// Base path: `{base_url}/` (e.g. `https://admin.example.com/api/`)
// Auth: `Authorization: Bearer <token>` once signed in

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::api::CatalogApi;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{
    DeleteProbe, ListQuery, LookupItem, LookupList, MaybeWrapped, Page, Resource, SignInResponse,
};

/// HTTP implementation of [`CatalogApi`].
///
/// Holds the bearer token behind a lock so the session layer can attach
/// or drop it while requests are in flight elsewhere.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl CatalogClient {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let mut url = Url::parse(base_url)?;
        // Joining relative paths requires a trailing slash.
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));

        Ok(Self {
            http,
            base_url: url,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn entity_path(resource: Resource, id: i64) -> String {
        format!("{}/{id}", resource.path())
    }

    // ── Auth header ──────────────────────────────────────────────────

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        let Some(token) = guard.as_ref() else {
            return builder;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
            Ok(mut value) => {
                value.set_sensitive(true);
                builder.header(AUTHORIZATION, value)
            }
            Err(_) => builder,
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.authorize(self.http.get(url).query(params)).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url).json(body)).send().await?;
        self.handle_response(resp).await
    }

    async fn post_no_response(&self, path: &str, body: &Value) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url).json(body)).send().await?;
        self.handle_empty(resp).await
    }

    async fn put<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.authorize(self.http.put(url).json(body)).send().await?;
        self.handle_response(resp).await
    }

    async fn delete_path(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.authorize(self.http.delete(url)).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::from_status(status.as_u16(), &body))
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    fn set_token(&self, token: Option<SecretString>) {
        debug!(attached = token.is_some(), "updating bearer credential");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SignInResponse, Error> {
        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        let wrapped: MaybeWrapped<SignInResponse> = self.post("auth/login", &body).await?;
        Ok(wrapped.into_inner())
    }

    async fn sign_out(&self) -> Result<(), Error> {
        self.post_no_response("auth/logout", &json!({})).await
    }

    async fn list(&self, resource: Resource, query: &ListQuery) -> Result<Page<Value>, Error> {
        let wrapped: MaybeWrapped<Page<Value>> =
            self.get(resource.path(), &query.to_params()).await?;
        Ok(wrapped.into_inner())
    }

    async fn create(&self, resource: Resource, payload: &Value) -> Result<Value, Error> {
        let wrapped: MaybeWrapped<Value> = self.post(resource.path(), payload).await?;
        Ok(wrapped.into_inner())
    }

    async fn update(&self, resource: Resource, id: i64, payload: &Value) -> Result<Value, Error> {
        let wrapped: MaybeWrapped<Value> =
            self.put(&Self::entity_path(resource, id), payload).await?;
        Ok(wrapped.into_inner())
    }

    async fn delete(&self, resource: Resource, id: i64) -> Result<(), Error> {
        self.delete_path(&Self::entity_path(resource, id)).await
    }

    async fn probe_delete(&self, resource: Resource, id: i64) -> Result<DeleteProbe, Error> {
        let path = format!("{}/deletable", Self::entity_path(resource, id));
        let wrapped: MaybeWrapped<DeleteProbe> = self.get(&path, &[]).await?;
        Ok(wrapped.into_inner())
    }

    async fn set_membership(&self, resource: Resource, id: i64, member: bool) -> Result<(), Error> {
        let path = Self::entity_path(resource, id);
        if member {
            self.post_no_response(&path, &json!({})).await
        } else {
            self.delete_path(&path).await
        }
    }

    async fn lookups(&self, list: LookupList) -> Result<Vec<LookupItem>, Error> {
        let wrapped: MaybeWrapped<Vec<LookupItem>> = self.get(list.path(), &[]).await?;
        Ok(wrapped.into_inner())
    }
}
