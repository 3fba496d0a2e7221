//! `maildown send`

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::DEFAULT_BACKEND;
use crate::backend::{backend_by_name, Connector, SendRequest};
use crate::config::ConfigStore;
use crate::error::MaildownResult;
use crate::render::Renderer;

/// Arguments for `send`
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Sender address (must be verified with the provider)
    pub sender: String,
    /// Message subject
    pub subject: String,
    /// Recipient addresses
    pub recipients: Vec<String>,
    /// Markdown content of the message
    #[arg(short, long)]
    pub content: Option<String>,
    /// File containing the Markdown content
    #[arg(short, long)]
    pub file_path: Option<PathBuf>,
    /// CSS file to style the message with
    #[arg(short, long)]
    pub theme: Option<PathBuf>,
    /// Template variable, may be repeated
    #[arg(short = 'e', long = "variable", value_name = "NAME=VALUE", value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,
    /// Email provider to use
    #[arg(long, default_value = DEFAULT_BACKEND)]
    pub backend: String,
}

impl From<SendArgs> for SendRequest {
    fn from(args: SendArgs) -> Self {
        SendRequest {
            sender: args.sender,
            subject: args.subject,
            recipients: args.recipients,
            content: args.content,
            file_path: args.file_path,
            context: args.variables.into_iter().collect::<BTreeMap<_, _>>(),
            theme: args.theme,
        }
    }
}

/// Parse `name=value`, splitting on the first `=`
fn parse_variable(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid variable '{}': expected NAME=VALUE", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid variable '{}': name is empty", s));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Handle `send`
pub fn handle_send_command(
    store: &dyn ConfigStore,
    connector: &dyn Connector,
    renderer: &Renderer,
    args: SendArgs,
    out: &mut dyn Write,
) -> MaildownResult<()> {
    let backend = backend_by_name(&args.backend, store, connector)?;
    backend.send(renderer, args.into())?;

    writeln!(out, "Messages added to queue")?;
    Ok(())
}
