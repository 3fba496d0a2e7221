//! Reader for the AWS CLI credentials file (`~/.aws/credentials`)

use std::path::Path;

use ini::Ini;

use crate::error::{MaildownError, MaildownResult};

/// Profile consulted in the credentials file
pub const DEFAULT_PROFILE: &str = "default";

const ACCESS_KEY_FIELD: &str = "aws_access_key_id";
const SECRET_KEY_FIELD: &str = "aws_secret_access_key";

/// Read the access key and secret key from the `[default]` profile
pub fn read_default_profile(path: &Path) -> MaildownResult<(String, String)> {
    let error = |reason: String| MaildownError::CredentialsFile {
        path: path.display().to_string(),
        reason,
    };

    // Secret keys may contain characters rust-ini would treat as escapes
    let conf = Ini::load_from_file_noescape(path).map_err(|e| error(e.to_string()))?;

    let section = conf
        .section(Some(DEFAULT_PROFILE))
        .ok_or_else(|| error(format!("missing [{}] section", DEFAULT_PROFILE)))?;

    let field = |name: &str| {
        section
            .get(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| error(format!("missing `{}`", name)))
    };

    Ok((field(ACCESS_KEY_FIELD)?, field(SECRET_KEY_FIELD)?))
}
