//! Credential resolution and validation

use tracing::{debug, info};

use super::{file, CredentialSources, Credentials};
use crate::backend::ses::client::Connector;
use crate::backend::ses::NAMESPACE;
use crate::config::{update_namespace, ConfigStore};
use crate::error::{MaildownError, MaildownResult};

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Resolve credentials, validate them against SES and persist them
///
/// Nothing is written to `store` unless validation succeeds.
pub fn resolve_and_store(
    sources: &CredentialSources,
    store: &dyn ConfigStore,
    connector: &dyn Connector,
) -> MaildownResult<Credentials> {
    resolve_and_store_with_env(sources, store, connector, |name| std::env::var(name).ok())
}

/// Same as [`resolve_and_store`] with an explicit environment lookup
pub fn resolve_and_store_with_env<F>(
    sources: &CredentialSources,
    store: &dyn ConfigStore,
    connector: &dyn Connector,
    env: F,
) -> MaildownResult<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = resolve(sources, env)?;
    validate(&credentials, connector)?;

    update_namespace(store, NAMESPACE, credentials.to_table())?;
    info!(
        access_key = credentials.access_key(),
        region = credentials.region(),
        "stored validated credentials"
    );
    Ok(credentials)
}

/// Pick credentials from the highest-precedence source that has any
pub fn resolve<F>(sources: &CredentialSources, env: F) -> MaildownResult<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    let mut access_key = present(sources.access_key.clone());
    let mut secret_key = present(sources.secret_key.clone());
    let mut origin = "arguments";

    if access_key.is_none() && secret_key.is_none() {
        access_key = present(env(ACCESS_KEY_VAR));
        secret_key = present(env(SECRET_KEY_VAR));
        origin = "environment";
    }

    if access_key.is_none() && secret_key.is_none() {
        let (file_access_key, file_secret_key) =
            file::read_default_profile(&sources.credentials_file)?;
        access_key = Some(file_access_key);
        secret_key = Some(file_secret_key);
        origin = "credentials file";
    }

    match (access_key, secret_key) {
        (Some(access_key), Some(secret_key)) => {
            debug!(origin, "resolved credentials");
            Ok(Credentials::new(access_key, secret_key, sources.region.clone()))
        }
        _ => Err(MaildownError::MissingCredentials),
    }
}

/// Make a no-op authenticated call; any service error means bad credentials
fn validate(credentials: &Credentials, connector: &dyn Connector) -> MaildownResult<()> {
    let client = connector.connect(credentials)?;
    match client.list_configuration_sets() {
        Ok(()) => Ok(()),
        Err(err) if err.is_service_error() => Err(MaildownError::InvalidCredentials(err.to_string())),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ses::client::{MockConnector, MockSesApi, SesApi};
    use crate::config::{load_namespace, ConfigStore, Configuration, MemoryConfigStore};
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn no_env() -> impl Fn(&str) -> Option<String> {
        env_from(&[])
    }

    fn credentials_file(dir: &TempDir, access_key: &str, secret_key: &str) -> PathBuf {
        let path = dir.path().join("credentials");
        fs::write(
            &path,
            format!(
                "[default]\naws_access_key_id = {}\naws_secret_access_key = {}\n",
                access_key, secret_key
            ),
        )
        .unwrap();
        path
    }

    fn accepting_connector() -> MockConnector {
        let mut connector = MockConnector::new();
        connector.expect_connect().returning(|_| {
            let mut api = MockSesApi::new();
            api.expect_list_configuration_sets().returning(|| Ok(()));
            Ok(Box::new(api) as Box<dyn SesApi>)
        });
        connector
    }

    fn rejecting_connector() -> MockConnector {
        let mut connector = MockConnector::new();
        connector.expect_connect().times(1).returning(|_| {
            let mut api = MockSesApi::new();
            api.expect_list_configuration_sets().times(1).returning(|| {
                Err(MaildownError::ProviderRequest {
                    code: "InvalidClientTokenId".into(),
                    message: "The security token included in the request is invalid.".into(),
                    status: 403,
                })
            });
            Ok(Box::new(api) as Box<dyn SesApi>)
        });
        connector
    }

    #[test]
    fn explicit_keys_win_over_environment_and_file() {
        let dir = TempDir::new().unwrap();
        let sources = CredentialSources::new(credentials_file(&dir, "FILE", "file-secret"))
            .with_keys("ARGS", "args-secret");
        let env = env_from(&[(ACCESS_KEY_VAR, "ENV"), (SECRET_KEY_VAR, "env-secret")]);

        let credentials = resolve(&sources, env).unwrap();
        assert_eq!(credentials.access_key(), "ARGS");
        assert_eq!(credentials.secret_key(), "args-secret");
    }

    #[test]
    fn environment_wins_over_file() {
        let dir = TempDir::new().unwrap();
        let sources = CredentialSources::new(credentials_file(&dir, "FILE", "file-secret"));
        let env = env_from(&[(ACCESS_KEY_VAR, "ENV"), (SECRET_KEY_VAR, "env-secret")]);

        let credentials = resolve(&sources, env).unwrap();
        assert_eq!(credentials.access_key(), "ENV");
        assert_eq!(credentials.secret_key(), "env-secret");
    }

    #[test]
    fn falls_back_to_credentials_file() {
        let dir = TempDir::new().unwrap();
        let sources = CredentialSources::new(credentials_file(&dir, "FILE", "file-secret"))
            .with_region("eu-central-1");

        let credentials = resolve(&sources, no_env()).unwrap();
        assert_eq!(credentials.access_key(), "FILE");
        assert_eq!(credentials.region(), "eu-central-1");
    }

    #[test]
    fn half_explicit_keys_are_missing_credentials() {
        let dir = TempDir::new().unwrap();
        let mut sources = CredentialSources::new(credentials_file(&dir, "FILE", "file-secret"));
        sources.access_key = Some("ARGS".into());

        let err = resolve(&sources, no_env()).unwrap_err();
        assert!(matches!(err, MaildownError::MissingCredentials));
    }

    #[test]
    fn missing_file_section_is_a_credentials_file_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, "[other]\naws_access_key_id = A\n").unwrap();

        let err = resolve(&CredentialSources::new(path), no_env()).unwrap_err();
        assert!(matches!(err, MaildownError::CredentialsFile { .. }));
    }

    #[test]
    fn stores_validated_credentials() {
        let store = MemoryConfigStore::new();
        let sources = CredentialSources::new("/unused").with_keys("ARGS", "args-secret");

        resolve_and_store_with_env(&sources, &store, &accepting_connector(), no_env()).unwrap();

        let aws = load_namespace(&store, NAMESPACE).unwrap();
        assert_eq!(aws["access_key"].as_str(), Some("ARGS"));
        assert_eq!(aws["secret_key"].as_str(), Some("args-secret"));
        assert_eq!(aws["region"].as_str(), Some("us-east-1"));
    }

    #[test]
    fn invalid_credentials_leave_config_untouched() {
        let mut existing = Configuration::new();
        existing.insert("theme".into(), "dark.css".into());
        let store = MemoryConfigStore::with_config(existing);
        let before = store.load().unwrap();

        let sources = CredentialSources::new("/unused").with_keys("BAD", "bad-secret");
        let err =
            resolve_and_store_with_env(&sources, &store, &rejecting_connector(), no_env())
                .unwrap_err();

        assert!(matches!(err, MaildownError::InvalidCredentials(_)));
        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn transport_failures_are_not_invalid_credentials() {
        let mut connector = MockConnector::new();
        connector.expect_connect().returning(|_| {
            let mut api = MockSesApi::new();
            api.expect_list_configuration_sets()
                .returning(|| Err(MaildownError::http("connection refused")));
            Ok(Box::new(api) as Box<dyn SesApi>)
        });
        let store = MemoryConfigStore::new();
        let sources = CredentialSources::new("/unused").with_keys("ARGS", "args-secret");

        let err = resolve_and_store_with_env(&sources, &store, &connector, no_env()).unwrap_err();
        assert!(matches!(err, MaildownError::ProviderRequest { .. }));
        assert!(store.load().unwrap().is_empty());
    }
}
