//! Message → middleware mapping.
//!
//! The mapping associates a message name with the identifiers of the
//! middleware that handle it. Values are kept as raw JSON so that a mapping can
//! be loaded from any configuration source; each value is normalised into a
//! [`MiddlewareList`] when it is looked up.
//!
//! ```toml
//! [messages]
//! "user.registered" = "SendWelcomeEmail"
//! "order.placed" = ["ReserveStock", "ChargeCard"]
//! "cache.warmup" = []
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WorkerError, WorkerResult};

/// The middleware identifiers mapped to one message name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MiddlewareList {
    /// A single identifier.
    Single(String),
    /// An ordered list of identifiers, possibly empty.
    Many(Vec<String>),
}

impl MiddlewareList {
    /// Returns the identifiers in invocation order.
    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        match self {
            Self::Single(identifier) => std::slice::from_ref(identifier),
            Self::Many(identifiers) => identifiers,
        }
    }

    /// Returns the number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers().len()
    }

    /// Returns `true` if no middleware is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers().is_empty()
    }
}

impl TryFrom<&Value> for MiddlewareList {
    type Error = WorkerError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(identifier) => Ok(Self::Single(identifier.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(identifier) => Ok(identifier.clone()),
                    other => Err(WorkerError::invalid_mapped_type(format!(
                        "array containing {}",
                        kind_of(other)
                    ))),
                })
                .collect::<WorkerResult<Vec<_>>>()
                .map(Self::Many),
            other => Err(WorkerError::invalid_mapped_type(kind_of(other))),
        }
    }
}

impl From<&str> for MiddlewareList {
    fn from(identifier: &str) -> Self {
        Self::Single(identifier.to_string())
    }
}

impl From<Vec<String>> for MiddlewareList {
    fn from(identifiers: Vec<String>) -> Self {
        Self::Many(identifiers)
    }
}

impl From<MiddlewareList> for Value {
    fn from(list: MiddlewareList) -> Self {
        match list {
            MiddlewareList::Single(identifier) => Self::String(identifier),
            MiddlewareList::Many(identifiers) => {
                Self::Array(identifiers.into_iter().map(Self::String).collect())
            }
        }
    }
}

/// Returns a short name for the kind of a JSON value.
#[must_use]
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Mapping from message name to mapped middleware.
///
/// Entries keep their insertion order. Values are not validated on insertion;
/// [`MessageMap::lookup`] validates the entry it returns and
/// [`MessageMap::validate`] checks every entry at once.
///
/// # Example
///
/// ```
/// use ebworker_core::{MessageMap, MiddlewareList};
/// use serde_json::json;
///
/// let messages = MessageMap::new()
///     .with("user.registered", json!("SendWelcomeEmail"))
///     .with("order.placed", json!(["ReserveStock", "ChargeCard"]));
///
/// let list = messages.lookup("order.placed").unwrap();
/// assert_eq!(list.identifiers(), ["ReserveStock", "ChargeCard"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageMap(IndexMap<String, Value>);

impl MessageMap {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mapping with an additional entry.
    #[must_use]
    pub fn with(mut self, message_name: impl Into<String>, mapped: impl Into<Value>) -> Self {
        self.0.insert(message_name.into(), mapped.into());
        self
    }

    /// Returns the raw mapped value for a message name.
    #[must_use]
    pub fn get(&self, message_name: &str) -> Option<&Value> {
        self.0.get(message_name)
    }

    /// Looks up and normalises the middleware mapped to a message name.
    ///
    /// # Errors
    ///
    /// - [`WorkerError::MissingMapping`] if the name has no entry
    /// - [`WorkerError::InvalidMappedType`] if the entry is neither a string
    ///   nor an array of strings
    pub fn lookup(&self, message_name: &str) -> WorkerResult<MiddlewareList> {
        let mapped = self
            .get(message_name)
            .ok_or_else(|| WorkerError::missing_mapping(message_name))?;
        MiddlewareList::try_from(mapped)
    }

    /// Validates every entry.
    ///
    /// Returns the name of the first invalid entry alongside its error.
    pub fn validate(&self) -> Result<(), (String, WorkerError)> {
        for (name, mapped) in &self.0 {
            MiddlewareList::try_from(mapped).map_err(|err| (name.clone(), err))?;
        }
        Ok(())
    }

    /// Returns the mapped message names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the number of mapped messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, Value>> for MessageMap {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Self(entries)
    }
}

impl<K: Into<String>> FromIterator<(K, MiddlewareList)> for MessageMap {
    fn from_iter<I: IntoIterator<Item = (K, MiddlewareList)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, list)| (name.into(), Value::from(list)))
                .collect(),
        )
    }
}
