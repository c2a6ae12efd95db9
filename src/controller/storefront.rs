use std::sync::Arc;

use tracing::{info, instrument, warn};
use url::Url;

use crate::action_framework::ActionResult;
use crate::controller::control::Control;
use crate::controller::views::Confirm;
use crate::endpoint::Endpoint;
use crate::error::ActionError;
use crate::labels;
use crate::notifications::{Family, Level, NotificationCenter};
use crate::transport::{self, Body};

pub const PURCHASE_PROMPT: &str = "Confirma a compra deste produto?";
pub const PURCHASE_SUCCESS: &str = "Produto adicionado ao carrinho!";
pub const REQUEST_FAILED: &str = "Erro na requisição";

/// Where the shopper continues after a successful purchase.
pub const CHECKOUT_PATH: &str = "/checkout";

/// Customer-side actions of the storefront catalogue.
#[derive(Clone)]
pub struct StorefrontActions {
    http: reqwest::Client,
    base_url: Url,
    notifications: NotificationCenter,
    confirm: Arc<dyn Confirm>,
}

impl StorefrontActions {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        notifications: NotificationCenter,
        confirm: impl Confirm + 'static,
    ) -> Self {
        Self {
            http,
            base_url,
            notifications,
            confirm: Arc::new(confirm),
        }
    }

    /// Asks for confirmation, then buys `product_id`.
    ///
    /// On success `data` is the server reply and the caller moves on to
    /// [`CHECKOUT_PATH`]. Failures are reported as toasts.
    #[instrument(skip(self, control))]
    pub async fn purchase(&self, control: &Control, product_id: i64) -> Result<ActionResult, ActionError> {
        if control.is_busy() {
            return Err(ActionError::Busy);
        }
        if !self.confirm.confirm(PURCHASE_PROMPT) {
            info!("Purchase declined");
            return Err(ActionError::UserAborted);
        }
        let Some(_busy) = control.show_busy(labels::LOADING) else {
            return Err(ActionError::Busy);
        };

        let endpoint = Endpoint::purchase(product_id);
        let result = match transport::execute(&self.http, &self.base_url, &endpoint, Body::Empty).await {
            Ok(reply) => {
                info!("Purchase accepted");
                self.notifications.notify(Level::Success, Family::Toast, PURCHASE_SUCCESS);
                ActionResult::success(reply, PURCHASE_SUCCESS)
            }
            Err(err) => {
                let message = match &err {
                    ActionError::Application { detail: Some(detail), .. } => detail.clone(),
                    _ => REQUEST_FAILED.to_string(),
                };
                warn!(error = %err, "Purchase failed");
                self.notifications.notify(Level::Error, Family::Toast, message.clone());
                ActionResult::failure(err, message)
            }
        };
        Ok(result)
    }
}
