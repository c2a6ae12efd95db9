use anyhow::Context;
use tracing::{error, info};
use url::Url;

use crate::action_framework::{ResourceActor, ResourceClient};
use crate::app_system::Settings;
use crate::controller::{AccountForms, Confirm, StorefrontActions};
use crate::domain::{Product, Transaction, User};
use crate::notifications::NotificationCenter;

/// Starts one resource gateway per resource kind and hands out their clients.
///
/// Responsible for startup, shared HTTP client and notification wiring, and shutdown.
pub struct AdminSystem {
    pub product_client: ResourceClient<Product>,
    pub user_client: ResourceClient<User>,
    pub transaction_client: ResourceClient<Transaction>,
    pub account_forms: AccountForms,
    pub notifications: NotificationCenter,
    http: reqwest::Client,
    base_url: Url,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl AdminSystem {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("invalid base url {:?}", settings.base_url))?;
        // No client-side timeout: the transport's own limits govern latency.
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        let notifications = NotificationCenter::new(settings.notification_ttl());
        let buffer = settings.channel_buffer.max(1);

        info!(base_url = %base_url, "Starting admin system");

        let (product_actor, product_client) = ResourceActor::<Product>::new(buffer, http.clone(), base_url.clone());
        let product_handle = tokio::spawn(product_actor.run());

        let (user_actor, user_client) = ResourceActor::<User>::new(buffer, http.clone(), base_url.clone());
        let user_handle = tokio::spawn(user_actor.run());

        let (transaction_actor, transaction_client) =
            ResourceActor::<Transaction>::new(buffer, http.clone(), base_url.clone());
        let transaction_handle = tokio::spawn(transaction_actor.run());

        let account_forms = AccountForms::new(http.clone(), base_url.clone(), notifications.clone());

        Ok(Self {
            product_client,
            user_client,
            transaction_client,
            account_forms,
            notifications,
            http,
            base_url,
            handles: vec![product_handle, user_handle, transaction_handle],
        })
    }

    /// Storefront purchase actions sharing this system's HTTP client and notifications.
    pub fn storefront(&self, confirm: impl Confirm + 'static) -> StorefrontActions {
        StorefrontActions::new(self.http.clone(), self.base_url.clone(), self.notifications.clone(), confirm)
    }

    /// Drops every client, which closes the gateway channels, then waits for the gateways.
    ///
    /// Controllers built from cloned clients keep their gateway alive; drop them first.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!("Shutting down admin system...");

        drop(self.product_client);
        drop(self.user_client);
        drop(self.transaction_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Gateway task failed: {:?}", e);
                return Err(anyhow::anyhow!("gateway task failed: {e}"));
            }
        }

        info!("Admin system shutdown complete.");
        Ok(())
    }
}
