//! Path management for Maildown
//!
//! ## Path Resolution Order
//!
//! 1. `MAILDOWN_HOME` environment variable (if set)
//! 2. The user's home directory as reported by the OS

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::error::MaildownError;

/// Name of the config file inside the home directory
pub const CONFIG_FILE_NAME: &str = "maildown.toml";

/// Manages all paths used by Maildown
#[derive(Debug, Clone)]
pub struct MaildownPaths {
    home_dir: PathBuf,
}

impl MaildownPaths {
    /// Create a new MaildownPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, MaildownError> {
        let home_dir = if let Ok(custom) = std::env::var("MAILDOWN_HOME") {
            PathBuf::from(custom)
        } else {
            BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .ok_or_else(|| MaildownError::Io("Could not determine home directory".into()))?
        };

        Ok(Self { home_dir })
    }

    /// Create MaildownPaths rooted at a custom directory (useful for testing)
    pub fn with_home_dir(home_dir: PathBuf) -> Self {
        Self { home_dir }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Get the path to the config file (~/maildown.toml)
    pub fn config_file(&self) -> PathBuf {
        self.home_dir.join(CONFIG_FILE_NAME)
    }

    /// Get the default AWS credentials file (~/.aws/credentials)
    pub fn aws_credentials_file(&self) -> PathBuf {
        self.home_dir.join(".aws").join("credentials")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_home_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MaildownPaths::with_home_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.home_dir(), temp_dir.path());
        assert_eq!(paths.config_file(), temp_dir.path().join("maildown.toml"));
        assert_eq!(
            paths.aws_credentials_file(),
            temp_dir.path().join(".aws").join("credentials")
        );
    }
}
