use reqwest::Method;
use tracing::{info, instrument, warn};
use url::Url;

use crate::action_framework::ActionResult;
use crate::controller::control::Control;
use crate::endpoint::Endpoint;
use crate::error::ActionError;
use crate::labels;
use crate::notifications::{Family, Level, NotificationCenter};
use crate::transport::{self, Body};
use crate::validation::AccountForm;

/// Submits the storefront login and registration forms.
///
/// Validation failures are reported as toasts and never reach the network.
#[derive(Clone)]
pub struct AccountForms {
    http: reqwest::Client,
    base_url: Url,
    notifications: NotificationCenter,
}

impl AccountForms {
    pub fn new(http: reqwest::Client, base_url: Url, notifications: NotificationCenter) -> Self {
        Self {
            http,
            base_url,
            notifications,
        }
    }

    #[instrument(skip(self, control, form), fields(action = form.action()))]
    pub async fn submit(&self, control: &Control, form: &AccountForm) -> Result<ActionResult, ActionError> {
        let Some(_busy) = control.show_busy(labels::LOADING) else {
            return Err(ActionError::Busy);
        };

        if let Err(reason) = form.validate() {
            warn!(reason = %reason, "Account form rejected");
            self.notifications.notify(Level::Error, Family::Toast, reason.to_string());
            return Err(reason.into());
        }

        let endpoint = Endpoint::new(Method::POST, form.action());
        let result = match transport::execute(&self.http, &self.base_url, &endpoint, Body::Form(form.to_form())).await {
            Ok(reply) => {
                let message = success_message(form);
                info!("Account form accepted");
                self.notifications.notify(Level::Success, Family::Toast, message);
                ActionResult::success(reply, message)
            }
            Err(err) => {
                let message = match &err {
                    ActionError::Application { detail, .. } => format!(
                        "Erro ao enviar formulário: {}",
                        detail.as_deref().unwrap_or(labels::UNKNOWN_ERROR)
                    ),
                    _ => "Erro ao enviar formulário. Tente novamente.".to_string(),
                };
                warn!(error = %err, "Account form failed");
                self.notifications.notify(Level::Error, Family::Toast, message.clone());
                ActionResult::failure(err, message)
            }
        };
        Ok(result)
    }
}

fn success_message(form: &AccountForm) -> &'static str {
    match form {
        AccountForm::Login { .. } => "Login realizado com sucesso!",
        AccountForm::Register { .. } => "Usuário registrado com sucesso! Faça login para continuar.",
    }
}
