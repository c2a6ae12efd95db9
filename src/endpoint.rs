//! Fixed REST endpoint patterns for every resource operation.

use std::fmt;

use reqwest::Method;

use crate::action_framework::{Operation, ResourceKind};

/// Prefix shared by every admin resource endpoint.
pub const API_PREFIX: &str = "/admin/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Builds the endpoint for `operation` on `kind`.
    ///
    /// `target` is ignored for `Create`; callers are expected to have checked
    /// that it is present for every other operation (see `ActionRequest::new`).
    pub fn for_operation(kind: ResourceKind, operation: Operation, target: Option<&str>) -> Self {
        let collection = format!("{API_PREFIX}/{}", kind.collection());
        let member = |id: &str| format!("{collection}/{id}");
        let target = target.unwrap_or_default();

        match operation {
            Operation::Create => Self::new(Method::POST, collection),
            Operation::Read => Self::new(Method::GET, member(target)),
            Operation::Update => Self::new(Method::PUT, member(target)),
            Operation::Delete => Self::new(Method::DELETE, member(target)),
            Operation::ToggleStatus => Self::new(Method::PUT, format!("{}/status", member(target))),
        }
    }
}

impl Endpoint {
    /// Storefront purchase of one product.
    pub fn purchase(product_id: i64) -> Self {
        Self::new(Method::POST, format!("/api/purchase/{product_id}"))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
