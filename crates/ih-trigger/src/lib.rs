//! idhook lifecycle hooks
//!
//! Handles user pool trigger events:
//! - pre sign-up: rejects duplicate emails and sets the confirmation flags
//! - post confirmation: notifies the downstream API
//! - post authentication: logged only
//!
//! Other trigger kinds are returned unchanged.

mod dispatcher;
mod error;
pub mod directory;
pub mod event;
pub mod notifier;

pub use dispatcher::{LifecycleDispatcher, DEFAULT_PAGE_SIZE};
pub use directory::{AttributeFilter, DirectoryClient, PrincipalRecord, UserQuery};
pub use error::TriggerError;
pub use event::{EventRequest, InvocationContext, LifecycleEvent, TriggerSource};
pub use notifier::{
    ConfirmationNotifier, ConfirmationPayload, DisabledNotifier, HttpConfirmationNotifier,
    HttpNotifierConfig,
};

#[cfg(feature = "cognito")]
pub use directory::CognitoDirectoryClient;
