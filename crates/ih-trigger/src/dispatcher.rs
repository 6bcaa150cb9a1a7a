use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::directory::{DirectoryClient, UserQuery};
use crate::notifier::{ConfirmationNotifier, ConfirmationPayload};
use crate::{InvocationContext, LifecycleEvent, TriggerError, TriggerSource};

/// Default bound on the uniqueness query.
pub const DEFAULT_PAGE_SIZE: i32 = 10;

/// Routes a user pool trigger event to the behaviour for its kind.
///
/// Returns the event with only `response` changed, or an error that rejects
/// the operation.
pub struct LifecycleDispatcher {
    directory: Arc<dyn DirectoryClient>,
    notifier: Arc<dyn ConfirmationNotifier>,
    page_size: i32,
}

impl LifecycleDispatcher {
    pub fn new(directory: Arc<dyn DirectoryClient>, notifier: Arc<dyn ConfirmationNotifier>) -> Self {
        Self {
            directory,
            notifier,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }

    pub async fn dispatch(
        &self,
        event: LifecycleEvent,
        ctx: &InvocationContext,
    ) -> Result<LifecycleEvent, TriggerError> {
        let span = info_span!(
            "lifecycle",
            request_id = %ctx.request_id,
            trigger_source = %event.trigger_source,
            user_pool_id = %event.user_pool_id,
        );
        self.route(event).instrument(span).await
    }

    async fn route(&self, mut event: LifecycleEvent) -> Result<LifecycleEvent, TriggerError> {
        if event.trigger_source.is_pre_sign_up() {
            self.ensure_email_unique(&event).await?;
        }

        match &event.trigger_source {
            TriggerSource::PreSignUpSignUp | TriggerSource::PreSignUpAdminCreateUser => {
                event.set_pre_sign_up_flags(false, false);
                info!(user_name = %event.user_name, "Pre sign-up accepted, confirmation required");
            }
            TriggerSource::PreSignUpExternalProvider => {
                event.set_pre_sign_up_flags(true, true);
                info!(user_name = %event.user_name, "Federated sign-up accepted, auto confirmed");
            }
            TriggerSource::PostConfirmationConfirmSignUp => {
                info!(user_name = %event.user_name, "User confirmed");
                let payload = ConfirmationPayload::from_event(&event);
                self.notifier.notify(&payload).await?;
            }
            TriggerSource::PostAuthentication => {
                info!(user_name = %event.user_name, "User authenticated");
            }
            TriggerSource::Other(kind) => {
                debug!(trigger_source = %kind, "Unhandled trigger, passing through");
            }
        }
        Ok(event)
    }

    /// Reject the sign-up if any principal in the pool already has the email.
    ///
    /// An event without an email attribute has nothing to collide with.
    async fn ensure_email_unique(&self, event: &LifecycleEvent) -> Result<(), TriggerError> {
        let Some(email) = event.email() else {
            debug!("No email attribute, skipping uniqueness check");
            return Ok(());
        };

        let query = UserQuery::email_equals(&event.user_pool_id, email, self.page_size);
        let existing = self.directory.list_users(&query).await.map_err(|e| {
            warn!(error = %e, "Uniqueness query failed");
            e
        })?;

        if let Some(first) = existing.first() {
            warn!(
                email = %ih_common::mask_email(email),
                existing_user = %first.username,
                existing_status = first.status.as_deref().unwrap_or("UNKNOWN"),
                existing_enabled = first.enabled,
                matches = existing.len(),
                "Email already registered"
            );
            return Err(TriggerError::DuplicateEmail { email: email.to_string() });
        }

        debug!(email = %ih_common::mask_email(email), "Email is unique");
        Ok(())
    }
}
