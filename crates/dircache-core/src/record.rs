//! Directory records and their indexed attributes.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use crate::error::{DirectoryError, Result};
use crate::types::{IndexKind, RecordType};

/// Value of an indexed record attribute.
///
/// Exactly one of: no value, a single string, or an ordered or unordered
/// collection of strings. Any other shape is rejected when the record is
/// built (see [`IndexValue::from_json`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum IndexValue {
    #[default]
    Absent,
    Single(String),
    Ordered(Vec<String>),
    Unordered(BTreeSet<String>),
}

impl IndexValue {
    /// Converts a loosely typed attribute value into an `IndexValue`.
    ///
    /// `null` maps to `Absent`, a string to `Single` and an array of strings
    /// to `Ordered`. Anything else is an `UnsupportedShape` error.
    ///
    /// # Example
    ///
    /// ```
    /// use dircache_core::IndexValue;
    /// use serde_json::json;
    ///
    /// let value = IndexValue::from_json("shortNames", &json!(["alice", "al"])).unwrap();
    /// assert_eq!(value.values(), vec!["alice", "al"]);
    ///
    /// assert!(IndexValue::from_json("shortNames", &json!(42)).is_err());
    /// ```
    pub fn from_json(attribute: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Absent),
            Value::String(s) => Ok(Self::Single(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(DirectoryError::unsupported_shape(
                        attribute,
                        "a list containing non-string values",
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Ordered),
            Value::Bool(_) => Err(DirectoryError::unsupported_shape(attribute, "a boolean")),
            Value::Number(_) => Err(DirectoryError::unsupported_shape(attribute, "a number")),
            Value::Object(_) => Err(DirectoryError::unsupported_shape(attribute, "an object")),
        }
    }

    /// Returns every index value carried by this attribute.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Absent => Vec::new(),
            Self::Single(value) => vec![value.as_str()],
            Self::Ordered(values) => values.iter().map(String::as_str).collect(),
            Self::Unordered(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Returns true when the attribute carries no value at all.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns true if `key` is one of the values.
    pub fn contains(&self, key: &str) -> bool {
        match self {
            Self::Absent => false,
            Self::Single(value) => value == key,
            Self::Ordered(values) => values.iter().any(|v| v == key),
            Self::Unordered(values) => values.contains(key),
        }
    }
}

/// An identity entity (user, group, location, resource) held by the cache.
///
/// `cached_time` is taken from the tokio clock when the record is built;
/// freshness is never stored, it is computed against a TTL at read time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    record_type: RecordType,
    guid: IndexValue,
    short_names: IndexValue,
    email_addresses: IndexValue,
    auth_ids: BTreeSet<String>,
    full_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    calendar_user_addresses: BTreeSet<String>,
    auto_schedule: bool,
    enabled_for_calendaring: Option<bool>,
    uid: Option<String>,
    #[serde(skip)]
    cached_time: Instant,
}

impl Record {
    /// Creates a new builder for a record of the given type.
    pub fn builder(record_type: impl Into<RecordType>) -> RecordBuilder {
        RecordBuilder::new(record_type.into())
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    pub fn guid(&self) -> Option<&str> {
        match &self.guid {
            IndexValue::Single(guid) => Some(guid),
            _ => None,
        }
    }

    /// Returns the uid, which defaults to the guid.
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref().or_else(|| self.guid())
    }

    pub fn short_names(&self) -> Vec<&str> {
        self.short_names.values()
    }

    pub fn email_addresses(&self) -> Vec<&str> {
        self.email_addresses.values()
    }

    pub fn auth_ids(&self) -> &BTreeSet<String> {
        &self.auth_ids
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn calendar_user_addresses(&self) -> &BTreeSet<String> {
        &self.calendar_user_addresses
    }

    pub fn auto_schedule(&self) -> bool {
        self.auto_schedule
    }

    pub fn enabled_for_calendaring(&self) -> Option<bool> {
        self.enabled_for_calendaring
    }

    /// Returns the attribute backing the given index.
    pub fn index_value(&self, kind: IndexKind) -> &IndexValue {
        match kind {
            IndexKind::Guid => &self.guid,
            IndexKind::ShortName => &self.short_names,
            IndexKind::Email => &self.email_addresses,
        }
    }

    /// Time at which this record was built.
    pub fn cached_time(&self) -> Instant {
        self.cached_time
    }

    /// Returns how long ago the record was built.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.cached_time)
    }

    /// Returns true while `now - cached_time < ttl`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) < ttl
    }

    /// Returns a copy of this record stamped with the current time.
    pub fn refreshed(&self) -> Self {
        Self {
            cached_time: Instant::now(),
            ..self.clone()
        }
    }
}

/// Builder for [`Record`].
///
/// # Example
///
/// ```
/// use dircache_core::{IndexKind, Record};
///
/// let record = Record::builder("users")
///     .guid("g1")
///     .short_name("alice")
///     .email_address("alice@example.com")
///     .build();
///
/// assert_eq!(record.guid(), Some("g1"));
/// assert!(record.index_value(IndexKind::Email).contains("alice@example.com"));
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    record_type: RecordType,
    guid: IndexValue,
    short_names: Vec<String>,
    email_addresses: BTreeSet<String>,
    auth_ids: BTreeSet<String>,
    full_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    calendar_user_addresses: BTreeSet<String>,
    auto_schedule: bool,
    enabled_for_calendaring: Option<bool>,
    uid: Option<String>,
    cached_time: Option<Instant>,
}

impl RecordBuilder {
    fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            guid: IndexValue::Absent,
            short_names: Vec::new(),
            email_addresses: BTreeSet::new(),
            auth_ids: BTreeSet::new(),
            full_name: None,
            first_name: None,
            last_name: None,
            calendar_user_addresses: BTreeSet::new(),
            auto_schedule: false,
            enabled_for_calendaring: None,
            uid: None,
            cached_time: None,
        }
    }

    pub fn guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = IndexValue::Single(guid.into());
        self
    }

    /// Appends a short name. Order is preserved.
    pub fn short_name(mut self, name: impl Into<String>) -> Self {
        self.short_names.push(name.into());
        self
    }

    pub fn short_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.short_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn email_address(mut self, email: impl Into<String>) -> Self {
        self.email_addresses.insert(email.into());
        self
    }

    pub fn email_addresses<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.email_addresses
            .extend(emails.into_iter().map(Into::into));
        self
    }

    pub fn auth_id(mut self, auth_id: impl Into<String>) -> Self {
        self.auth_ids.insert(auth_id.into());
        self
    }

    pub fn full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    pub fn calendar_user_address(mut self, address: impl Into<String>) -> Self {
        self.calendar_user_addresses.insert(address.into());
        self
    }

    pub fn auto_schedule(mut self, enabled: bool) -> Self {
        self.auto_schedule = enabled;
        self
    }

    pub fn enabled_for_calendaring(mut self, enabled: bool) -> Self {
        self.enabled_for_calendaring = Some(enabled);
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Overrides the construction timestamp.
    pub fn cached_at(mut self, instant: Instant) -> Self {
        self.cached_time = Some(instant);
        self
    }

    /// Builds the record, stamping it with the current time unless
    /// [`cached_at`](Self::cached_at) was given.
    pub fn build(self) -> Record {
        let short_names = if self.short_names.is_empty() {
            IndexValue::Absent
        } else {
            IndexValue::Ordered(self.short_names)
        };
        let email_addresses = if self.email_addresses.is_empty() {
            IndexValue::Absent
        } else {
            IndexValue::Unordered(self.email_addresses)
        };

        Record {
            record_type: self.record_type,
            guid: self.guid,
            short_names,
            email_addresses,
            auth_ids: self.auth_ids,
            full_name: self.full_name,
            first_name: self.first_name,
            last_name: self.last_name,
            calendar_user_addresses: self.calendar_user_addresses,
            auto_schedule: self.auto_schedule,
            enabled_for_calendaring: self.enabled_for_calendaring,
            uid: self.uid,
            cached_time: self.cached_time.unwrap_or_else(Instant::now),
        }
    }
}

/// Loosely typed on-disk form of a record, as found in record files.
///
/// Indexed attributes are kept as raw JSON values until
/// [`into_record`](Self::into_record) validates their shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSpec {
    pub record_type: RecordType,
    #[serde(default)]
    pub guid: Value,
    #[serde(default)]
    pub short_names: Value,
    #[serde(default)]
    pub email_addresses: Value,
    #[serde(default)]
    pub auth_ids: Vec<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub calendar_user_addresses: Vec<String>,
    #[serde(default)]
    pub auto_schedule: bool,
    #[serde(default)]
    pub enabled_for_calendaring: Option<bool>,
    #[serde(default)]
    pub uid: Option<String>,
}

impl RecordSpec {
    /// Validates the attribute shapes and builds a [`Record`].
    pub fn into_record(self) -> Result<Record> {
        let guid = match IndexValue::from_json(IndexKind::Guid.attribute(), &self.guid)? {
            IndexValue::Ordered(_) => {
                return Err(DirectoryError::unsupported_shape(
                    IndexKind::Guid.attribute(),
                    "a list",
                ));
            },
            value => value,
        };
        let short_names =
            IndexValue::from_json(IndexKind::ShortName.attribute(), &self.short_names)?;
        let email_addresses = match IndexValue::from_json(
            IndexKind::Email.attribute(),
            &self.email_addresses,
        )? {
            IndexValue::Ordered(values) => IndexValue::Unordered(values.into_iter().collect()),
            value => value,
        };

        Ok(Record {
            record_type: self.record_type,
            guid,
            short_names,
            email_addresses,
            auth_ids: self.auth_ids.into_iter().collect(),
            full_name: self.full_name,
            first_name: self.first_name,
            last_name: self.last_name,
            calendar_user_addresses: self.calendar_user_addresses.into_iter().collect(),
            auto_schedule: self.auto_schedule,
            enabled_for_calendaring: self.enabled_for_calendaring,
            uid: self.uid,
            cached_time: Instant::now(),
        })
    }
}
