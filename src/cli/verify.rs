//! `maildown verify`

use std::io::Write;

use clap::Args;

use super::DEFAULT_BACKEND;
use crate::backend::{backend_by_name, Connector};
use crate::config::ConfigStore;
use crate::error::MaildownResult;

/// Arguments for `verify`
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Address to verify as a sender
    pub email: String,
    /// Email provider to use
    #[arg(long, default_value = DEFAULT_BACKEND)]
    pub backend: String,
}

/// Handle `verify`
pub fn handle_verify_command(
    store: &dyn ConfigStore,
    connector: &dyn Connector,
    args: VerifyArgs,
    out: &mut dyn Write,
) -> MaildownResult<()> {
    let backend = backend_by_name(&args.backend, store, connector)?;

    if backend.verify_address(&args.email)? {
        writeln!(out, "This email address has already been verified")?;
    } else {
        writeln!(
            out,
            "Email sent to {}. You must click the link in this email to verify ownership \
             before you can send any emails",
            args.email
        )?;
    }
    Ok(())
}
