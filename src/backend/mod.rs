//! Email provider backends
//!
//! A backend knows how to log in, verify sender addresses and hand a fully
//! rendered message to its provider. The flow that turns a [`SendRequest`]
//! into an [`OutgoingMessage`] is shared by every backend and lives on the
//! trait as a provided method.

pub mod ses;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::ConfigStore;
use crate::credentials::CredentialSources;
use crate::error::{MaildownError, MaildownResult};
use crate::render::{load_theme, Renderer};

pub use ses::AwsBackend;
pub use ses::client::{Connector, HttpConnector, SesApi, SesClient};

/// Names accepted by `--backend`
pub const AVAILABLE_BACKENDS: &[&str] = &[ses::NAMESPACE];

/// A message ready to be dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    /// Rendered, CSS-inlined and substituted HTML
    pub html_body: String,
    /// The raw Markdown source
    pub text_body: String,
}

/// Everything needed to send one message
///
/// Exactly one of `content` and `file_path` must be set.
#[derive(Debug, Clone, Default)]
pub struct SendRequest {
    pub sender: String,
    pub subject: String,
    pub recipients: Vec<String>,
    pub content: Option<String>,
    pub file_path: Option<PathBuf>,
    pub context: BTreeMap<String, String>,
    /// Path to a CSS file; the bundled stylesheet is used when absent
    pub theme: Option<PathBuf>,
}

impl SendRequest {
    /// Read the Markdown source from whichever of content/file path was given
    pub fn markup(&self) -> MaildownResult<String> {
        match (&self.content, &self.file_path) {
            (Some(content), None) => Ok(content.clone()),
            (None, Some(path)) => fs::read_to_string(path).map_err(|e| {
                MaildownError::Io(format!("Failed to read {}: {}", path.display(), e))
            }),
            _ => Err(MaildownError::AmbiguousContent),
        }
    }
}

/// An email provider
pub trait Backend {
    /// Name used for `--backend` and as the config namespace
    fn name(&self) -> &'static str;

    /// Resolve, validate and persist credentials
    fn login(&self, sources: &CredentialSources) -> MaildownResult<()>;

    /// Returns `true` if `email` is already a verified sender; otherwise asks
    /// the provider to send a verification mail and returns `false`
    fn verify_address(&self, email: &str) -> MaildownResult<bool>;

    /// Dispatch an already rendered message, returning the provider's id
    fn send_message(&self, message: &OutgoingMessage) -> MaildownResult<String>;

    /// Render `request` and dispatch it
    fn send(&self, renderer: &Renderer, request: SendRequest) -> MaildownResult<String> {
        if request.recipients.is_empty() {
            return Err(MaildownError::NoRecipients);
        }
        let markup = request.markup()?;
        let theme_css = load_theme(request.theme.as_deref())?;
        let html_body = renderer.render(&markup, &theme_css, &request.context)?;

        let message = OutgoingMessage {
            sender: request.sender,
            recipients: request.recipients,
            subject: request.subject,
            html_body,
            text_body: markup,
        };
        debug!(
            backend = self.name(),
            recipients = message.recipients.len(),
            html_bytes = message.html_body.len(),
            "dispatching message"
        );

        let id = self.send_message(&message)?;
        info!(backend = self.name(), message_id = %id, "message accepted");
        Ok(id)
    }
}

/// Look up a backend by name
pub fn backend_by_name<'a>(
    name: &str,
    store: &'a dyn ConfigStore,
    connector: &'a dyn Connector,
) -> MaildownResult<Box<dyn Backend + 'a>> {
    match name {
        ses::NAMESPACE => Ok(Box::new(AwsBackend::new(store, connector))),
        other => Err(MaildownError::UnknownBackend(other.to_string())),
    }
}
