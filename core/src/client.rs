//! Client facade over the endpoint catalog.
//!
//! # Design
//! `Client` owns the credentials and a [`Dispatcher`]. Resource handles
//! (`client.moves()`, `client.events().body()`, ...) are thin views that
//! route every operation through [`Client::call`], which validates the
//! options, plans the request from the catalog row, and either reports a
//! local error through the callback or sends exactly one request.
//!
//! Credentials sit behind a lock and are read when a request is built, so a
//! token change applies to later calls and never to one already in flight.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::{Endpoint, Operation, Resource, SubResource};
use crate::config::Config;
use crate::credentials::Credentials;
use crate::dispatch::{Callback, Dispatcher};
use crate::error::ApiError;
use crate::http::{HttpRequest, SimulatedTransport, Transport};
use crate::query::{encode_component, serialize, validate};

/// Client for the nudge API.
pub struct Client {
    credentials: RwLock<Credentials>,
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.dispatcher.base_url())
            .field("client_id", &self.credentials.read().client_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials: RwLock::new(Credentials::from(config)),
            dispatcher: Dispatcher::new(config.base_url(), transport),
        }
    }

    pub fn with_transport<T: Transport + 'static>(config: &Config, transport: T) -> Self {
        Self::new(config, Arc::new(transport))
    }

    /// A client whose calls complete with the request URL instead of
    /// touching the network.
    pub fn simulated(config: &Config) -> Self {
        Self::with_transport(config, SimulatedTransport)
    }

    /// A client backed by a real HTTP transport.
    #[cfg(feature = "ureq")]
    pub fn http(config: &Config) -> Self {
        Self::with_transport(config, crate::ureq_transport::UreqTransport::new())
    }

    pub fn version(&self) -> &'static str {
        crate::VERSION
    }

    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    pub fn credentials(&self) -> Credentials {
        self.credentials.read().clone()
    }

    pub fn client_id(&self) -> Option<String> {
        self.credentials.read().client_id.clone()
    }

    pub fn client_secret(&self) -> Option<String> {
        self.credentials.read().client_secret.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.credentials.read().access_token.clone()
    }

    pub fn set_client_id(&self, id: impl Into<String>) {
        self.credentials.write().client_id = Some(id.into());
    }

    pub fn set_client_secret(&self, secret: impl Into<String>) {
        self.credentials.write().client_secret = Some(secret.into());
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        self.credentials.write().access_token = Some(token.into());
    }

    /// Assign credentials from a JSON mapping. Non-string values and
    /// non-mapping input are ignored.
    pub fn configure(&self, values: &Value) {
        if let Some(map) = values.as_object() {
            self.credentials.write().apply(map);
        }
    }

    // -----------------------------------------------------------------------
    // Resource handles
    // -----------------------------------------------------------------------

    pub fn resource(&self, resource: Resource) -> ResourceApi<'_> {
        ResourceApi {
            client: self,
            endpoint: resource.endpoint(),
        }
    }

    pub fn moves(&self) -> ResourceApi<'_> {
        self.resource(Resource::Moves)
    }

    pub fn sleeps(&self) -> ResourceApi<'_> {
        self.resource(Resource::Sleeps)
    }

    pub fn workouts(&self) -> ResourceApi<'_> {
        self.resource(Resource::Workouts)
    }

    pub fn meals(&self) -> ResourceApi<'_> {
        self.resource(Resource::Meals)
    }

    pub fn mood(&self) -> ResourceApi<'_> {
        self.resource(Resource::Mood)
    }

    pub fn events(&self) -> Events<'_> {
        Events { client: self }
    }

    pub fn friends(&self) -> ResourceApi<'_> {
        self.resource(Resource::Friends)
    }

    pub fn timezone(&self) -> ResourceApi<'_> {
        self.resource(Resource::Timezone)
    }

    pub fn trends(&self) -> ResourceApi<'_> {
        self.resource(Resource::Trends)
    }

    pub fn goals(&self) -> ResourceApi<'_> {
        self.resource(Resource::Goals)
    }

    pub fn settings(&self) -> ResourceApi<'_> {
        self.resource(Resource::Settings)
    }

    pub fn refresh_token(&self) -> RefreshTokenApi<'_> {
        RefreshTokenApi { client: self }
    }

    pub fn webhook(&self) -> WebhookApi<'_> {
        WebhookApi { client: self }
    }

    // -----------------------------------------------------------------------
    // Request planning
    // -----------------------------------------------------------------------

    /// Build the request an operation would send, without sending it.
    pub fn build_request(
        &self,
        resource: Resource,
        op: Operation,
        options: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let params = options.as_object().ok_or(ApiError::BadParameters)?;
        self.plan(resource.endpoint(), op, params)
    }

    /// `POST /users/@me/refreshToken` with the configured client secret.
    pub fn build_refresh_token(&self) -> Result<HttpRequest, ApiError> {
        let creds = self.credentials.read();
        let secret = creds
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::MissingConfiguration("client secret"))?;
        let mut form = Map::new();
        form.insert("secret".to_string(), Value::String(secret.to_string()));
        Ok(self
            .dispatcher
            .build_post("/users/@me/refreshToken", &form, &creds.bearer()))
    }

    /// `POST /users/@me/pubsub?webhook=<url>`
    pub fn build_webhook_create(&self, url: Option<&str>) -> Result<HttpRequest, ApiError> {
        let url = url
            .filter(|u| !u.is_empty())
            .ok_or(ApiError::MissingConfiguration("webhook url"))?;
        let path = format!("/users/@me/pubsub?webhook={}", encode_component(url));
        Ok(self.dispatcher.build_post(&path, &Map::new(), &self.bearer()))
    }

    /// `DELETE /users/@me/pubsub`
    pub fn build_webhook_delete(&self) -> HttpRequest {
        self.dispatcher
            .build_delete("/users/@me/pubsub", &self.bearer())
    }

    fn bearer(&self) -> String {
        self.credentials.read().bearer()
    }

    fn plan(
        &self,
        endpoint: &'static Endpoint,
        op: Operation,
        params: &Map<String, Value>,
    ) -> Result<HttpRequest, ApiError> {
        if !endpoint.supports(op) {
            return Err(ApiError::Unsupported {
                resource: endpoint.name,
                operation: op.name().to_string(),
            });
        }
        let bearer = self.bearer();
        let d = &self.dispatcher;
        let request = match op {
            Operation::Get => match xid(params) {
                Some(id) if endpoint.supports(Operation::GetById) => {
                    d.build_get(&endpoint.item_path(&id), &bearer)
                }
                _ => {
                    let query: Map<String, Value> = params
                        .iter()
                        .filter(|(k, _)| k.as_str() != "xid")
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    let path = format!("{}?{}", endpoint.collection_path(), serialize(&query));
                    d.build_get(&path, &bearer)
                }
            },
            Operation::GetById => d.build_get(&endpoint.item_path(&require_xid(params)?), &bearer),
            Operation::Create => d.build_post(&endpoint.collection_path(), params, &bearer),
            Operation::Update => {
                let id = require_xid(params)?;
                let empty = Map::new();
                let data = match params.get("data") {
                    None | Some(Value::Null) => &empty,
                    Some(Value::Object(data)) => data,
                    Some(_) => return Err(ApiError::BadParameters),
                };
                d.build_post(&endpoint.update_path(&id), data, &bearer)
            }
            Operation::Delete => d.build_delete(&endpoint.item_path(&require_xid(params)?), &bearer),
            Operation::Sub(sub) => {
                d.build_get(&endpoint.sub_path(&require_xid(params)?, sub), &bearer)
            }
        };
        Ok(request)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Run `op` on `resource` and deliver the raw response body to
    /// `callback`. Local errors are reported synchronously and never reach
    /// the transport.
    pub fn call<F>(&self, resource: Resource, op: Operation, options: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        let Some((params, callback)) = validate(options, Some(callback)) else {
            debug!(resource = resource.endpoint().name, %op, "rejected: options not a mapping");
            return;
        };
        let planned = self.plan(resource.endpoint(), op, params);
        self.submit(planned, Box::new(callback));
    }

    fn submit(&self, planned: Result<HttpRequest, ApiError>, callback: Callback) {
        match planned {
            Ok(request) => self.dispatcher.send(request, callback),
            Err(err) => {
                debug!(error = %err, "rejected before dispatch");
                callback(Err(err));
            }
        }
    }
}

/// Non-empty identifier from `options.xid`. Numbers are accepted and
/// stringified.
fn xid(params: &Map<String, Value>) -> Option<String> {
    match params.get("xid")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn require_xid(params: &Map<String, Value>) -> Result<String, ApiError> {
    xid(params).ok_or(ApiError::MissingIdentifier)
}

/// Operations on one catalog resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceApi<'a> {
    client: &'a Client,
    endpoint: &'static Endpoint,
}

impl<'a> ResourceApi<'a> {
    pub fn endpoint(&self) -> &'static Endpoint {
        self.endpoint
    }

    /// A single item when `options.xid` is set, otherwise the collection
    /// with the remaining options as query parameters.
    pub fn get<F>(&self, options: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        self.client
            .call(self.endpoint.resource, Operation::Get, options, callback);
    }

    /// POST `data` as the form body of a new item.
    pub fn create<F>(&self, data: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        self.client
            .call(self.endpoint.resource, Operation::Create, data, callback);
    }

    /// POST `options.data` to the item's `partialUpdate` path.
    pub fn update<F>(&self, options: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        self.client
            .call(self.endpoint.resource, Operation::Update, options, callback);
    }

    pub fn delete<F>(&self, options: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        self.client
            .call(self.endpoint.resource, Operation::Delete, options, callback);
    }

    pub fn image<F>(&self, options: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        self.sub(SubResource::Image, options, callback);
    }

    pub fn snapshot<F>(&self, options: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        self.sub(SubResource::Snapshot, options, callback);
    }

    pub fn ticks<F>(&self, options: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        self.sub(SubResource::Ticks, options, callback);
    }

    fn sub<F>(&self, sub: SubResource, options: &Value, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        self.client
            .call(self.endpoint.resource, Operation::Sub(sub), options, callback);
    }
}

/// The three event families.
#[derive(Debug, Clone, Copy)]
pub struct Events<'a> {
    client: &'a Client,
}

impl<'a> Events<'a> {
    pub fn body(&self) -> ResourceApi<'a> {
        self.client.resource(Resource::BodyEvents)
    }

    pub fn cardiac(&self) -> ResourceApi<'a> {
        self.client.resource(Resource::CardiacEvents)
    }

    pub fn generic(&self) -> ResourceApi<'a> {
        self.client.resource(Resource::GenericEvents)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefreshTokenApi<'a> {
    client: &'a Client,
}

impl RefreshTokenApi<'_> {
    /// Request a refreshed token. Fails locally when no client secret is
    /// configured.
    pub fn get<F>(&self, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        let planned = self.client.build_refresh_token();
        self.client.submit(planned, Box::new(callback));
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WebhookApi<'a> {
    client: &'a Client,
}

impl WebhookApi<'_> {
    /// Register `url` for pub/sub notifications. Fails locally when the url
    /// is absent or empty.
    pub fn create<F>(&self, url: Option<&str>, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        let planned = self.client.build_webhook_create(url);
        self.client.submit(planned, Box::new(callback));
    }

    pub fn delete<F>(&self, callback: F)
    where
        F: FnOnce(Result<String, ApiError>) + Send + 'static,
    {
        let request = self.client.build_webhook_delete();
        self.client.submit(Ok(request), Box::new(callback));
    }
}
