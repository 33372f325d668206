//! Figma personal access token
//!
//! The token only ever leaves this type as the `X-Figma-Token` request
//! header, which is marked sensitive so reqwest keeps it out of its own
//! debug output. The backing string is zeroized on drop.

use reqwest::header::{HeaderValue, InvalidHeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Written in place of the token when a configuration is serialized
const REDACTED: &str = "[REDACTED]";

/// Access token sent with every Figma API request
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token.into()))
    }

    /// An unset or whitespace-only token
    pub fn is_blank(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }

    /// Header value for the request; surrounding whitespace from env files is dropped
    ///
    /// # Errors
    ///
    /// Fails if the token contains characters that can't appear in a header.
    pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(self.0.expose_secret().trim())?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// The raw token, for comparisons in tests and diagnostics that need it
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Default for AccessToken {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            f.write_str("AccessToken(<unset>)")
        } else {
            write!(f, "AccessToken({REDACTED})")
        }
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl Serialize for AccessToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}
