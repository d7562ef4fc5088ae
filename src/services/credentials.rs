//! API credential loading from a local `name = value` file.
//!
//! ```text
//! public = 0123abcd...
//! passphrase = hunter2
//! secret = c2VjcmV0...
//! ```

use crate::error::{BotError, BotResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub public_key: String,
    pub passphrase: String,
    /// Base64-encoded signing secret.
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("passphrase", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn load(path: impl AsRef<Path>) -> BotResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            BotError::Parse(format!(
                "Cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> BotResult<Self> {
        let mut values: HashMap<String, String> = HashMap::new();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, value) = line.split_once('=').ok_or_else(|| {
                BotError::Parse(format!(
                    "Credentials line {} is not `name = value`",
                    idx + 1
                ))
            })?;
            values.insert(name.trim().to_lowercase(), value.trim().to_string());
        }

        let take = |names: &[&str]| -> BotResult<String> {
            names
                .iter()
                .find_map(|n| values.get(*n).filter(|v| !v.is_empty()).cloned())
                .ok_or_else(|| BotError::Parse(format!("Credentials missing '{}'", names[0])))
        };

        let credentials = Self {
            public_key: take(&["public", "key"])?,
            passphrase: take(&["passphrase", "password"])?,
            secret: take(&["secret", "private"])?,
        };

        STANDARD
            .decode(&credentials.secret)
            .map_err(|_| BotError::Parse("Credentials 'secret' is not valid base64".into()))?;

        Ok(credentials)
    }
}
