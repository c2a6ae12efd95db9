//! Controller layer: per-control busy state, view capabilities, modal edit
//! sessions, the action controllers that tie them to the resource gateways,
//! and the storefront's account and purchase actions.

pub mod account;
pub mod action;
pub mod control;
pub mod session;
pub mod storefront;
pub mod views;

pub use account::AccountForms;
pub use action::ActionController;
pub use control::{BusyGuard, Control, ControlState};
pub use session::{EditSession, SessionMode};
pub use storefront::StorefrontActions;
pub use views::{Confirm, ResourceView};
