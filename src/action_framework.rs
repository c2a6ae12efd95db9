use std::fmt::{self, Debug, Display};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, Instrument};
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::{ActionError, ValidationError};
use crate::transport::{self, ApiReply, Body};

// =============================================================================
// 1. THE ABSTRACTION (resource kinds, operations, and the Resource trait)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Product,
    User,
    Transaction,
}

impl ResourceKind {
    /// Path segment of the collection endpoint.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Product => "products",
            ResourceKind::User => "users",
            ResourceKind::Transaction => "transactions",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Product => "product",
            ResourceKind::User => "user",
            ResourceKind::Transaction => "transaction",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    ToggleStatus,
}

impl Operation {
    pub fn requires_target(self) -> bool {
        !matches!(self, Operation::Create)
    }

    pub fn is_destructive(self) -> bool {
        matches!(self, Operation::Delete)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::ToggleStatus => "toggle_status",
        })
    }
}

/// Trait implemented by every resource representation the admin API serves.
pub trait Resource: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    type Id: Clone + PartialEq + Display + Debug + Send + Sync + 'static;

    const KIND: ResourceKind;

    fn id(&self) -> &Self::Id;

    /// Whether the admin API exposes `operation` for this resource.
    fn supports(operation: Operation) -> bool;

    /// Field values an edit form shows for this record.
    fn to_form(&self) -> FormData {
        FormData::new()
    }

    /// Client-side checks on a form before it is sent with Create or Update.
    fn validate(_operation: Operation, _form: &FormData) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Ordered key/value pairs read from a form, sent form-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Value of `key` with surrounding whitespace removed, `None` when blank.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Form(FormData),
    Json(Value),
}

// =============================================================================
// 2. REQUESTS, RESULTS, AND THE GENERIC MESSAGES
// =============================================================================

/// One user gesture translated into a resource operation. Consumed once.
#[derive(Debug, Clone)]
pub struct ActionRequest<T: Resource> {
    operation: Operation,
    target: Option<T::Id>,
    payload: Option<Payload>,
    display_name: Option<String>,
}

impl<T: Resource> ActionRequest<T> {
    pub fn new(
        operation: Operation,
        target: Option<T::Id>,
        payload: Option<Payload>,
    ) -> Result<Self, ActionError> {
        if !T::supports(operation) {
            return Err(ActionError::InvalidRequest(format!(
                "{} does not support {}",
                T::KIND,
                operation
            )));
        }
        match (operation.requires_target(), &target) {
            (true, None) => {
                return Err(ActionError::InvalidRequest(format!("{operation} requires a target id")))
            }
            (false, Some(id)) => {
                return Err(ActionError::InvalidRequest(format!(
                    "{operation} must not carry a target id (got {id})"
                )))
            }
            _ => {}
        }
        match (operation, &payload) {
            (Operation::Create | Operation::Update, Some(Payload::Form(_))) => {}
            (Operation::Create | Operation::Update, _) => {
                return Err(ActionError::InvalidRequest(format!("{operation} requires form data")))
            }
            (Operation::ToggleStatus, Some(Payload::Json(body)))
                if body.get("is_active").is_some_and(Value::is_boolean) => {}
            (Operation::ToggleStatus, _) => {
                return Err(ActionError::InvalidRequest(
                    "toggle_status requires a boolean is_active body".into(),
                ))
            }
            (Operation::Read | Operation::Delete, None) => {}
            (Operation::Read | Operation::Delete, Some(_)) => {
                return Err(ActionError::InvalidRequest(format!("{operation} takes no payload")))
            }
        }

        Ok(Self {
            operation,
            target,
            payload,
            display_name: None,
        })
    }

    pub fn create(form: FormData) -> Result<Self, ActionError> {
        Self::new(Operation::Create, None, Some(Payload::Form(form)))
    }

    pub fn read(id: T::Id) -> Result<Self, ActionError> {
        Self::new(Operation::Read, Some(id), None)
    }

    pub fn update(id: T::Id, form: FormData) -> Result<Self, ActionError> {
        Self::new(Operation::Update, Some(id), Some(Payload::Form(form)))
    }

    pub fn delete(id: T::Id) -> Result<Self, ActionError> {
        Self::new(Operation::Delete, Some(id), None)
    }

    /// Sends the inverse of `currently_active`.
    pub fn toggle_status(id: T::Id, currently_active: bool) -> Result<Self, ActionError> {
        Self::new(
            Operation::ToggleStatus,
            Some(id),
            Some(Payload::Json(json!({ "is_active": !currently_active }))),
        )
    }

    /// Name shown to the user, e.g. in the delete confirmation.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn resource_kind(&self) -> ResourceKind {
        T::KIND
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn target(&self) -> Option<&T::Id> {
        self.target.as_ref()
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn form(&self) -> Option<&FormData> {
        match &self.payload {
            Some(Payload::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        let target = self.target.as_ref().map(ToString::to_string);
        Endpoint::for_operation(T::KIND, self.operation, target.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// What the UI is reconciled against once a dispatched request settles.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub outcome: Outcome,
    pub data: Option<Value>,
    pub message: String,
    pub error: Option<ActionError>,
}

impl ActionResult {
    pub fn success(data: Option<Value>, message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            data,
            message: message.into(),
            error: None,
        }
    }

    pub fn failure(error: ActionError, message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure,
            data: None,
            message: message.into(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

pub type Response<T> = oneshot::Sender<Result<T, ActionError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Resource> {
    Create {
        form: FormData,
        respond_to: Response<ApiReply>,
    },
    Read {
        id: T::Id,
        respond_to: Response<ApiReply>,
    },
    Update {
        id: T::Id,
        form: FormData,
        respond_to: Response<ApiReply>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<ApiReply>,
    },
    ToggleStatus {
        id: T::Id,
        is_active: bool,
        respond_to: Response<ApiReply>,
    },
}

// =============================================================================
// 3. THE GENERIC GATEWAY ACTOR
// =============================================================================

/// Owns the HTTP client for one resource kind and serves [`ResourceRequest`]s.
///
/// Every request runs on its own task, so a slow call never holds up
/// requests triggered from other controls.
pub struct ResourceActor<T: Resource> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    http: reqwest::Client,
    base_url: Url,
}

impl<T: Resource> ResourceActor<T> {
    pub fn new(buffer_size: usize, http: reqwest::Client, base_url: Url) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            http,
            base_url,
        };
        (actor, ResourceClient::new(sender))
    }

    #[instrument(name = "resource_actor", skip(self), fields(kind = %T::KIND))]
    pub async fn run(mut self) {
        info!("Resource gateway starting");

        while let Some(msg) = self.receiver.recv().await {
            let (endpoint, body, respond_to) = Self::route(msg);
            let http = self.http.clone();
            let base_url = self.base_url.clone();

            tokio::spawn(
                async move {
                    let result = transport::execute(&http, &base_url, &endpoint, body).await;
                    let _ = respond_to.send(result);
                }
                .in_current_span(),
            );
        }

        info!("Resource gateway stopped");
    }

    fn route(msg: ResourceRequest<T>) -> (Endpoint, Body, Response<ApiReply>) {
        let endpoint = |operation, id: Option<&T::Id>| {
            let id = id.map(ToString::to_string);
            Endpoint::for_operation(T::KIND, operation, id.as_deref())
        };

        match msg {
            ResourceRequest::Create { form, respond_to } => {
                (endpoint(Operation::Create, None), Body::Form(form), respond_to)
            }
            ResourceRequest::Read { id, respond_to } => {
                (endpoint(Operation::Read, Some(&id)), Body::Empty, respond_to)
            }
            ResourceRequest::Update { id, form, respond_to } => {
                (endpoint(Operation::Update, Some(&id)), Body::Form(form), respond_to)
            }
            ResourceRequest::Delete { id, respond_to } => {
                (endpoint(Operation::Delete, Some(&id)), Body::Empty, respond_to)
            }
            ResourceRequest::ToggleStatus {
                id,
                is_active,
                respond_to,
            } => (
                endpoint(Operation::ToggleStatus, Some(&id)),
                Body::Json(json!({ "is_active": is_active })),
                respond_to,
            ),
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Resource> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Resource> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call(
        &self,
        build: impl FnOnce(Response<ApiReply>) -> ResourceRequest<T>,
    ) -> Result<ApiReply, ActionError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ActionError::Unexpected("Resource gateway closed".to_string()))?;
        response
            .await
            .map_err(|_| ActionError::Unexpected("Resource gateway dropped the request".to_string()))?
    }

    #[instrument(skip(self, form), fields(kind = %T::KIND))]
    pub async fn create(&self, form: FormData) -> Result<ApiReply, ActionError> {
        self.call(|respond_to| ResourceRequest::Create { form, respond_to }).await
    }

    #[instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn read(&self, id: T::Id) -> Result<ApiReply, ActionError> {
        self.call(|respond_to| ResourceRequest::Read { id, respond_to }).await
    }

    #[instrument(skip(self, form), fields(kind = %T::KIND))]
    pub async fn update(&self, id: T::Id, form: FormData) -> Result<ApiReply, ActionError> {
        self.call(|respond_to| ResourceRequest::Update { id, form, respond_to }).await
    }

    #[instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn delete(&self, id: T::Id) -> Result<ApiReply, ActionError> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    #[instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn set_status(&self, id: T::Id, is_active: bool) -> Result<ApiReply, ActionError> {
        self.call(|respond_to| ResourceRequest::ToggleStatus {
            id,
            is_active,
            respond_to,
        })
        .await
    }

    /// Fetches and decodes one record.
    pub async fn fetch(&self, id: T::Id) -> Result<T, ActionError> {
        let reply = self.read(id).await?;
        decode_record(reply)
    }

    /// Routes an [`ActionRequest`] to the matching gateway call.
    pub async fn dispatch(&self, request: &ActionRequest<T>) -> Result<ApiReply, ActionError> {
        let missing_target = || ActionError::InvalidRequest(format!("{} requires a target id", request.operation()));
        let target = || request.target().cloned().ok_or_else(missing_target);
        let form = || request.form().cloned().unwrap_or_default();

        match request.operation() {
            Operation::Create => self.create(form()).await,
            Operation::Read => self.read(target()?).await,
            Operation::Update => self.update(target()?, form()).await,
            Operation::Delete => self.delete(target()?).await,
            Operation::ToggleStatus => {
                let is_active = match request.payload() {
                    Some(Payload::Json(body)) => body.get("is_active").and_then(Value::as_bool),
                    _ => None,
                }
                .ok_or_else(|| ActionError::InvalidRequest("missing is_active flag".into()))?;
                self.set_status(target()?, is_active).await
            }
        }
    }
}

/// Decodes a representation returned by the API.
pub fn decode_record<T: Resource>(reply: ApiReply) -> Result<T, ActionError> {
    let value = reply.ok_or_else(|| ActionError::Unexpected(format!("empty {} representation", T::KIND)))?;
    serde_json::from_value(value)
        .map_err(|e| ActionError::Unexpected(format!("malformed {} representation: {e}", T::KIND)))
}

// =============================================================================
// 5. TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, User};
    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{get, put},
        Form, Json, Router,
    };
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn start<T: Resource>(base_url: Url) -> ResourceClient<T> {
        let (actor, client) = ResourceActor::<T>::new(8, reqwest::Client::new(), base_url);
        tokio::spawn(actor.run());
        client
    }

    #[test]
    fn request_construction_enforces_target_rules() {
        assert!(ActionRequest::<Product>::create(FormData::new().with("name", "Foo")).is_ok());
        assert!(matches!(
            ActionRequest::<Product>::new(Operation::Read, None, None),
            Err(ActionError::InvalidRequest(_))
        ));
        assert!(matches!(
            ActionRequest::<Product>::new(Operation::Create, Some(1), Some(Payload::Form(FormData::new()))),
            Err(ActionError::InvalidRequest(_))
        ));
        assert!(matches!(
            ActionRequest::<User>::delete(3),
            Err(ActionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn toggle_status_inverts_the_current_flag() {
        let request = ActionRequest::<User>::toggle_status(5, true).unwrap();
        assert_eq!(request.payload(), Some(&Payload::Json(json!({ "is_active": false }))));
        assert_eq!(request.endpoint().path, "/admin/api/users/5/status");
    }

    #[test]
    fn toggle_status_body_must_carry_a_boolean_flag() {
        let missing = ActionRequest::<User>::new(Operation::ToggleStatus, Some(5), Some(Payload::Json(json!({}))));
        assert!(matches!(missing, Err(ActionError::InvalidRequest(_))));

        let stringly = ActionRequest::<User>::new(
            Operation::ToggleStatus,
            Some(5),
            Some(Payload::Json(json!({ "is_active": "false" }))),
        );
        assert!(matches!(stringly, Err(ActionError::InvalidRequest(_))));
    }

    #[test]
    fn form_data_replaces_repeated_keys() {
        let form: FormData = [("name", "Foo"), ("price", "10"), ("name", "Bar")].into_iter().collect();
        assert_eq!(form.get("name"), Some("Bar"));
        assert_eq!(form.iter().count(), 2);
        assert_eq!(form.non_blank("missing"), None);
    }

    #[tokio::test]
    async fn update_sends_form_encoded_fields() {
        let app = Router::new().route(
            "/admin/api/products/:id",
            put(|Path(id): Path<i64>, Form(fields): Form<HashMap<String, String>>| async move {
                Json(json!({ "id": id, "name": fields.get("name"), "price": 10.0 }))
            }),
        );
        let client = start::<Product>(serve(app).await);

        let reply = client
            .update(42, FormData::new().with("name", "Foo"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply["id"], 42);
        assert_eq!(reply["name"], "Foo");
    }

    #[tokio::test]
    async fn error_detail_is_surfaced() {
        let app = Router::new()
            .route(
                "/admin/api/products/:id",
                get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "detail": "Produto não encontrado" }))) }),
            )
            .route(
                "/admin/api/users/:id/status",
                put(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let base_url = serve(app).await;

        let products = start::<Product>(base_url.clone());
        let err = products.read(1).await.unwrap_err();
        assert_eq!(
            err,
            ActionError::Application {
                status: 404,
                detail: Some("Produto não encontrado".into())
            }
        );

        let users = start::<User>(base_url);
        let err = users.set_status(3, false).await.unwrap_err();
        assert_eq!(err, ActionError::Application { status: 500, detail: None });
    }

    #[tokio::test]
    async fn delete_accepts_empty_bodies() {
        let app = Router::new().route(
            "/admin/api/products/:id",
            axum::routing::delete(|| async { StatusCode::NO_CONTENT }),
        );
        let client = start::<Product>(serve(app).await);

        let request = ActionRequest::<Product>::delete(7).unwrap();
        assert_eq!(client.dispatch(&request).await, Ok(None));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = start::<Product>(Url::parse(&format!("http://{addr}")).unwrap());
        let err = client.read(1).await.unwrap_err();
        assert!(matches!(err, ActionError::Transport(_)), "got {err:?}");
    }
}
