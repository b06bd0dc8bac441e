//! Record type and index kind definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of directory identity (users, groups, locations, resources, ...).
///
/// The set of record types is supplied by the deployment; the directory
/// service keeps one record cache per configured type.
///
/// # Example
///
/// ```
/// use dircache_core::RecordType;
///
/// let rt = RecordType::new("users");
/// assert_eq!(rt.as_str(), "users");
/// assert_eq!(rt, RecordType::users());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordType(String);

impl RecordType {
    /// Creates a new record type.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the record type name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn users() -> Self {
        Self::new("users")
    }

    pub fn groups() -> Self {
        Self::new("groups")
    }

    pub fn locations() -> Self {
        Self::new("locations")
    }

    pub fn resources() -> Self {
        Self::new("resources")
    }

    /// The record types a deployment knows about when none are configured,
    /// in lookup order.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::users(),
            Self::groups(),
            Self::locations(),
            Self::resources(),
        ]
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An axis along which records are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Globally unique identifier.
    Guid,
    /// Short (login) names.
    ShortName,
    /// Email addresses.
    Email,
}

impl IndexKind {
    /// All index kinds, in the order caches index them.
    pub const ALL: [IndexKind; 3] = [IndexKind::Guid, IndexKind::ShortName, IndexKind::Email];

    /// Name of the record attribute backing this index.
    pub fn attribute(&self) -> &'static str {
        match self {
            IndexKind::Guid => "guid",
            IndexKind::ShortName => "shortNames",
            IndexKind::Email => "emailAddresses",
        }
    }

    /// Returns the index kind name as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Guid => "guid",
            IndexKind::ShortName => "shortname",
            IndexKind::Email => "email",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "guid" | "uid" => Ok(IndexKind::Guid),
            "shortname" | "short_name" => Ok(IndexKind::ShortName),
            "email" => Ok(IndexKind::Email),
            other => Err(format!("unknown index kind '{}'", other)),
        }
    }
}
