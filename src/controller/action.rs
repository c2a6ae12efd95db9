use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use crate::action_framework::{decode_record, ActionRequest, ActionResult, Operation, Resource, ResourceClient};
use crate::controller::control::Control;
use crate::controller::session::EditSession;
use crate::controller::views::{Confirm, ResourceView};
use crate::error::ActionError;
use crate::labels;
use crate::notifications::NotificationCenter;

/// Binds user gestures on one resource kind to gateway calls and reconciles
/// the view with the outcome.
///
/// ```text
/// Idle -> Confirming (delete only) -> Busy -> Idle (success or error effects)
/// ```
///
/// Every dispatched action settles back to idle; nothing is retried.
pub struct ActionController<T: Resource, V: ResourceView<T>> {
    client: ResourceClient<T>,
    view: Mutex<V>,
    notifications: NotificationCenter,
    confirm: Box<dyn Confirm>,
    refresh_delay: Duration,
}

impl<T: Resource, V: ResourceView<T>> ActionController<T, V> {
    pub fn new(
        client: ResourceClient<T>,
        view: V,
        notifications: NotificationCenter,
        confirm: impl Confirm + 'static,
    ) -> Self {
        Self {
            client,
            view: Mutex::new(view),
            notifications,
            confirm: Box::new(confirm),
            refresh_delay: Duration::ZERO,
        }
    }

    /// Pause between the success notification and the refresh of the list.
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.view())
    }

    fn view(&self) -> MutexGuard<'_, V> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs one action triggered from `control`.
    ///
    /// `Err` means no request was issued (busy control, declined confirmation,
    /// invalid form or request). Once a request is issued the result is always
    /// `Ok`, with `outcome` telling success from failure.
    #[instrument(
        skip(self, control, request),
        fields(kind = %T::KIND, operation = %request.operation(), target = ?request.target())
    )]
    pub async fn trigger(&self, control: &Control, request: ActionRequest<T>) -> Result<ActionResult, ActionError> {
        if control.is_busy() {
            debug!("Control busy, ignoring trigger");
            return Err(ActionError::Busy);
        }

        if request.operation().is_destructive() && !self.confirm_destructive(&request) {
            info!("Confirmation declined");
            return Err(ActionError::UserAborted);
        }

        if let Some(form) = request.form() {
            if let Err(reason) = T::validate(request.operation(), form) {
                warn!(reason = %reason, "Form rejected before dispatch");
                self.notifications.error(reason.to_string());
                return Err(reason.into());
            }
        }

        let progress = labels::progress_label(T::KIND, request.operation());
        let Some(_busy) = control.show_busy(&progress) else {
            return Err(ActionError::Busy);
        };

        let settled = AssertUnwindSafe(self.resolve(&request))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ActionError::Unexpected(panic_message(panic.as_ref()))));

        Ok(match settled {
            Ok(result) => result,
            Err(err) => self.fail(&request, err),
        })
    }

    fn confirm_destructive(&self, request: &ActionRequest<T>) -> bool {
        let name = match (request.display_name(), request.target()) {
            (Some(name), _) => name.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => String::new(),
        };
        self.confirm.confirm(&labels::confirm_delete_prompt(T::KIND, &name))
    }

    async fn resolve(&self, request: &ActionRequest<T>) -> Result<ActionResult, ActionError> {
        let reply = self.client.dispatch(request).await?;
        let operation = request.operation();
        let message = labels::success_message(T::KIND, operation).unwrap_or_default();

        match operation {
            Operation::Read => {
                let record: T = decode_record(reply.clone())?;
                let mut view = self.view();
                view.reset_form();
                view.render(&record);
                view.reveal();
            }
            Operation::Create | Operation::Update => {
                self.notifications.success(message.clone());
                {
                    let mut view = self.view();
                    view.hide();
                    view.reset_form();
                }
                self.refresh().await;
            }
            Operation::Delete => {
                self.notifications.success(message.clone());
                let removed = match request.target() {
                    Some(id) => self.view().remove_row(id),
                    None => false,
                };
                if !removed {
                    debug!("Row already gone from the list");
                }
            }
            Operation::ToggleStatus => {
                self.notifications.success(message.clone());
                self.refresh().await;
            }
        }

        info!("Action succeeded");
        Ok(ActionResult::success(reply, message))
    }

    async fn refresh(&self) {
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        self.view().refresh();
    }

    fn fail(&self, request: &ActionRequest<T>, err: ActionError) -> ActionResult {
        let message = labels::failure_message(T::KIND, request.operation(), &err);
        match &err {
            ActionError::Unexpected(reason) => error!(reason = %reason, "Action handler failed"),
            other => warn!(error = %other, "Action failed"),
        }
        self.notifications.error(message.clone());
        ActionResult::failure(err, message)
    }

    // --- Edit session operations ---

    /// Opens the edit form empty, in create mode.
    pub fn open_blank(&self, session: &mut EditSession<T>) {
        session.begin_create();
        let mut view = self.view();
        view.reset_form();
        view.reveal();
    }

    /// Loads `id` into the edit form. The session enters edit mode only when
    /// the record was loaded.
    pub async fn open_editor(
        &self,
        control: &Control,
        session: &mut EditSession<T>,
        id: T::Id,
    ) -> Result<ActionResult, ActionError> {
        let request = ActionRequest::read(id.clone())?;
        let result = self.trigger(control, request).await?;
        if result.is_success() {
            session.begin_edit(id);
        }
        Ok(result)
    }

    /// Submits the edit form as Create or Update depending on the session.
    pub async fn save(&self, control: &Control, session: &mut EditSession<T>) -> Result<ActionResult, ActionError> {
        let form = self.view().read_form();
        let request = session.save_request(form)?;
        let result = self.trigger(control, request).await?;
        if result.is_success() {
            session.close();
        }
        Ok(result)
    }

    pub fn close(&self, session: &mut EditSession<T>) {
        session.close();
        let mut view = self.view();
        view.hide();
        view.reset_form();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_string()
    }
}
