//! `maildown init`

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::DEFAULT_BACKEND;
use crate::backend::{backend_by_name, Connector};
use crate::config::{ConfigStore, MaildownPaths};
use crate::credentials::{CredentialSources, DEFAULT_REGION};
use crate::error::MaildownResult;

/// Arguments for `init`
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Email provider to configure
    #[arg(long, default_value = DEFAULT_BACKEND)]
    pub backend: String,
    /// Access key id (falls back to AWS_ACCESS_KEY_ID, then the credentials file)
    #[arg(long)]
    pub access_key: Option<String>,
    /// Secret access key
    #[arg(long)]
    pub secret_key: Option<String>,
    /// Region to send from
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,
    /// Credentials file to read when no keys are given [default: ~/.aws/credentials]
    #[arg(long, env = "AWS_SHARED_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,
}

impl InitArgs {
    fn into_sources(self, paths: &MaildownPaths) -> CredentialSources {
        CredentialSources {
            access_key: self.access_key,
            secret_key: self.secret_key,
            region: self.region,
            credentials_file: self
                .credentials_file
                .unwrap_or_else(|| paths.aws_credentials_file()),
        }
    }
}

/// Handle `init`: resolve, validate and store credentials
pub fn handle_init_command(
    paths: &MaildownPaths,
    store: &dyn ConfigStore,
    connector: &dyn Connector,
    args: InitArgs,
    out: &mut dyn Write,
) -> MaildownResult<()> {
    let backend = backend_by_name(&args.backend, store, connector)?;
    backend.login(&args.into_sources(paths))?;

    writeln!(out, "Initiated successfully")?;
    Ok(())
}
