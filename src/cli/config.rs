//! `maildown config`

use std::fmt::Write as _;
use std::io::Write;

use crate::config::{ConfigStore, Configuration, MaildownPaths};
use crate::error::MaildownResult;

const REDACTED: &str = "********";

/// Handle `config`: show paths and stored settings
pub fn handle_config_command(
    paths: &MaildownPaths,
    store: &dyn ConfigStore,
    out: &mut dyn Write,
) -> MaildownResult<()> {
    writeln!(out, "Maildown Configuration")?;
    writeln!(out, "======================")?;
    writeln!(out, "Config file:      {}", paths.config_file().display())?;
    writeln!(out, "Credentials file: {}", paths.aws_credentials_file().display())?;
    writeln!(out)?;

    let config = store.load()?;
    if config.is_empty() {
        writeln!(out, "Not configured. Run 'maildown init' to set up a backend.")?;
    } else {
        write!(out, "{}", format_settings(&config))?;
    }
    Ok(())
}

/// Render stored settings, hiding anything that looks like a secret
fn format_settings(config: &Configuration) -> String {
    let mut output = String::from("Settings:\n");
    for (key, value) in config {
        match value {
            toml::Value::Table(table) => {
                let _ = writeln!(output, "  [{}]", key);
                for (name, value) in table {
                    let _ = writeln!(output, "    {} = {}", name, display_value(name, value));
                }
            }
            other => {
                let _ = writeln!(output, "  {} = {}", key, display_value(key, other));
            }
        }
    }
    output
}

fn display_value(key: &str, value: &toml::Value) -> String {
    if key.contains("secret") {
        return REDACTED.to_string();
    }
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
