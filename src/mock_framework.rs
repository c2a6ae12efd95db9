//! # Mock Framework
//!
//! Utilities for testing controllers without an HTTP server.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_update`] or [`expect_delete`] to assert what
//! was dispatched and to answer it.

use tokio::sync::mpsc;

use crate::action_framework::{FormData, Resource, ResourceClient, ResourceRequest, Response};
use crate::transport::ApiReply;

/// Creates a mock client and a receiver for asserting requests.
///
/// The receiver stands in for the resource gateway: every request the client
/// sends arrives there, and the test decides how and when to answer it.
pub fn create_mock_client<T: Resource>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Resource>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(FormData, Response<ApiReply>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { form, respond_to }) => Some((form, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Read request
pub async fn expect_read<T: Resource>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<ApiReply>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Read { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Resource>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, FormData, Response<ApiReply>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, form, respond_to }) => Some((id, form, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Resource>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<ApiReply>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a ToggleStatus request
pub async fn expect_toggle_status<T: Resource>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, bool, Response<ApiReply>)> {
    match receiver.recv().await {
        Some(ResourceRequest::ToggleStatus {
            id,
            is_active,
            respond_to,
        }) => Some((id, is_active, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Product;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        let create_task = tokio::spawn(async move {
            let form = FormData::new().with("name", "Test").with("price", "10");
            client.create(form).await
        });

        let (form, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(form.get("name"), Some("Test"));
        responder.send(Ok(Some(json!({ "id": 1 })))).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(Some(json!({ "id": 1 }))));
    }
}
