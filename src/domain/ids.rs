//! Domain identifier types with validation
//!
//! Newtype wrappers for Figma identifiers. Each type keeps file keys and node
//! ids from being mixed up and rejects obviously malformed values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Figma file key
///
/// The opaque key found in a file URL (`figma.com/file/<key>/...`).
///
/// # Examples
///
/// ```
/// use figport::domain::ids::FileKey;
/// use std::str::FromStr;
///
/// let key = FileKey::from_str("FpKcPBk2q3wDhYzTfwBDq1").unwrap();
/// assert_eq!(key.as_str(), "FpKcPBk2q3wDhYzTfwBDq1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileKey(String);

impl FileKey {
    /// Creates a new FileKey from a string
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("File key cannot be empty".to_string());
        }
        if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!(
                "Invalid file key '{key}': only ASCII letters and digits are allowed"
            ));
        }
        Ok(Self(key))
    }

    /// Returns the file key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for FileKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Figma node identifier
///
/// Node ids take the form `<a>:<b>` (for example `12:345`). Instance
/// sublayers use `;`-separated chains such as `I1:2;3:4`, which are accepted
/// as-is.
///
/// # Examples
///
/// ```
/// use figport::domain::ids::NodeId;
/// use std::str::FromStr;
///
/// let node = NodeId::from_str("12:345").unwrap();
/// assert_eq!(node.as_str(), "12:345");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a new NodeId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Node ID cannot be empty".to_string());
        }
        if !id.contains(':') {
            return Err(format!(
                "Invalid node ID format. Expected format: {{a}}:{{b}}, got: {id}"
            ));
        }
        Ok(Self(id))
    }

    /// Returns the node ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
