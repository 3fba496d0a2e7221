//! Amazon SES backend
//!
//! Credentials live in the `[aws]` table of the config file. The SES client
//! is built through the injected [`Connector`] each time an operation needs
//! one, so whatever `init` last stored is always what gets used.

pub mod client;
pub mod signing;

use tracing::{debug, info};

use self::client::{Connector, SesApi};
use super::{Backend, OutgoingMessage};
use crate::config::{load_namespace, ConfigStore};
use crate::credentials::{self, CredentialSources, Credentials};
use crate::error::{MaildownError, MaildownResult};

/// Backend name and config namespace
pub const NAMESPACE: &str = "aws";

/// Sends mail through Amazon SES
pub struct AwsBackend<'a> {
    store: &'a dyn ConfigStore,
    connector: &'a dyn Connector,
}

impl<'a> AwsBackend<'a> {
    pub fn new(store: &'a dyn ConfigStore, connector: &'a dyn Connector) -> Self {
        Self { store, connector }
    }

    /// Credentials saved by the last successful login
    pub fn stored_credentials(&self) -> MaildownResult<Credentials> {
        let table = load_namespace(self.store, NAMESPACE)?;
        Credentials::from_table(&table).ok_or(MaildownError::MissingCredentials)
    }

    fn client(&self) -> MaildownResult<Box<dyn SesApi>> {
        let credentials = self.stored_credentials()?;
        debug!(region = credentials.region(), "connecting to SES");
        self.connector.connect(&credentials)
    }
}

impl Backend for AwsBackend<'_> {
    fn name(&self) -> &'static str {
        NAMESPACE
    }

    fn login(&self, sources: &CredentialSources) -> MaildownResult<()> {
        credentials::resolve_and_store(sources, self.store, self.connector).map(|_| ())
    }

    fn verify_address(&self, email: &str) -> MaildownResult<bool> {
        let client = self.client()?;
        let verified = client.list_verified_email_addresses()?;

        if verified.iter().any(|address| address == email) {
            debug!(email, "address already verified");
            return Ok(true);
        }

        client.verify_email_address(email)?;
        info!(email, "verification email requested");
        Ok(false)
    }

    fn send_message(&self, message: &OutgoingMessage) -> MaildownResult<String> {
        self.client()?.send_email(message)
    }
}

#[cfg(test)]
mod tests {
    use super::client::{MockConnector, MockSesApi};
    use super::*;
    use crate::config::{update_namespace, MemoryConfigStore};

    fn logged_in_store() -> MemoryConfigStore {
        let store = MemoryConfigStore::new();
        let credentials = Credentials::new("AKID", "secret", "eu-west-1");
        update_namespace(&store, NAMESPACE, credentials.to_table()).unwrap();
        store
    }

    fn connector_for(api: MockSesApi) -> MockConnector {
        let mut connector = MockConnector::new();
        connector
            .expect_connect()
            .withf(|credentials| credentials.region() == "eu-west-1")
            .times(1)
            .return_once(move |_| Ok(Box::new(api) as Box<dyn SesApi>));
        connector
    }

    #[test]
    fn verify_known_address_sends_no_request() {
        let mut api = MockSesApi::new();
        api.expect_list_verified_email_addresses()
            .times(1)
            .returning(|| Ok(vec!["a@b.com".to_string()]));
        api.expect_verify_email_address().times(0);

        let store = logged_in_store();
        let connector = connector_for(api);
        let backend = AwsBackend::new(&store, &connector);

        assert!(backend.verify_address("a@b.com").unwrap());
    }

    #[test]
    fn verify_unknown_address_requests_verification_once() {
        let mut api = MockSesApi::new();
        api.expect_list_verified_email_addresses()
            .times(1)
            .returning(|| Ok(vec!["other@b.com".to_string()]));
        api.expect_verify_email_address()
            .withf(|email| email == "a@b.com")
            .times(1)
            .returning(|_| Ok(()));

        let store = logged_in_store();
        let connector = connector_for(api);
        let backend = AwsBackend::new(&store, &connector);

        assert!(!backend.verify_address("a@b.com").unwrap());
    }

    #[test]
    fn operations_without_login_fail() {
        let store = MemoryConfigStore::new();
        let mut connector = MockConnector::new();
        connector.expect_connect().times(0);
        let backend = AwsBackend::new(&store, &connector);

        let err = backend.verify_address("a@b.com").unwrap_err();
        assert!(matches!(err, MaildownError::MissingCredentials));
    }

    #[test]
    fn send_message_returns_provider_id() {
        let mut api = MockSesApi::new();
        api.expect_send_email()
            .withf(|message| message.sender == "me@example.com")
            .times(1)
            .returning(|_| Ok("0100-abc".to_string()));

        let store = logged_in_store();
        let connector = connector_for(api);
        let backend = AwsBackend::new(&store, &connector);

        let message = OutgoingMessage {
            sender: "me@example.com".into(),
            recipients: vec!["you@example.com".into()],
            subject: "Hi".into(),
            html_body: "<p>Hi</p>".into(),
            text_body: "Hi".into(),
        };
        assert_eq!(backend.send_message(&message).unwrap(), "0100-abc");
    }

    #[test]
    fn provider_failures_are_not_retried() {
        let mut api = MockSesApi::new();
        api.expect_send_email().times(1).returning(|_| {
            Err(MaildownError::ProviderRequest {
                code: "MessageRejected".into(),
                message: "Email address is not verified.".into(),
                status: 400,
            })
        });

        let store = logged_in_store();
        let connector = connector_for(api);
        let backend = AwsBackend::new(&store, &connector);

        let message = OutgoingMessage {
            sender: "me@example.com".into(),
            recipients: vec!["you@example.com".into()],
            subject: "Hi".into(),
            html_body: String::new(),
            text_body: String::new(),
        };
        let err = backend.send_message(&message).unwrap_err();
        assert!(err.is_service_error());
    }
}
