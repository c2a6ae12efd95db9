//! Admin and storefront action handling for a digital-goods store.
//!
//! User gestures become typed [`action_framework::ActionRequest`]s, travel through a
//! per-resource gateway to the store's REST API, and settle back into the view as
//! notifications, re-rendered records, removed rows or refreshed lists.

pub mod action_framework;
pub mod app_system;
pub mod controller;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod labels;
pub mod notifications;
pub mod transport;
pub mod validation;

#[cfg(test)]
mod mock_framework;

pub use action_framework::{ActionRequest, ActionResult, FormData, Operation, Outcome, Resource, ResourceKind};
pub use error::{ActionError, ValidationError};
