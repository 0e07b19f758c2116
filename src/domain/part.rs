use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// A validated part identifier containing only lowercase ASCII letters,
/// digits and underscores (`[a-z0-9_]+`).
///
/// Identifiers are the keys of the part catalog and the only way parts refer
/// to each other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartId(NonEmptyString);

impl PartId {
    /// Creates a new `PartId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPartIdError`] if the string is empty or contains
    /// characters other than lowercase letters, digits and underscores.
    pub fn new(s: String) -> Result<Self, InvalidPartIdError> {
        let non_empty =
            NonEmptyString::new(s.clone()).map_err(|_| InvalidPartIdError(s.clone()))?;

        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(InvalidPartIdError(s));
        }

        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PartId {
    type Error = InvalidPartIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PartId {
    type Error = InvalidPartIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl From<PartId> for String {
    fn from(id: PartId) -> Self {
        id.as_str().to_string()
    }
}

impl AsRef<str> for PartId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// Ordering of `PartId` is the ordering of the underlying string, so ids can be
// looked up in sorted maps by `&str`.
impl Borrow<str> for PartId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Deref for PartId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartId {
    type Err = InvalidPartIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when a string doesn't match the part id pattern
/// `[a-z0-9_]+`.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid part id '{0}': must be non-empty and contain only lowercase letters, digits and \
     underscores"
)]
pub struct InvalidPartIdError(String);

/// The category a part belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartCategory {
    /// Wiring adapter between the vehicle and the device.
    Harness,
    /// Tool needed during installation. Tools are listed separately from
    /// parts in the bill of materials.
    Tool,
    /// A bundle of parts sold together.
    Kit,
    /// Cables, boxes and other small hardware.
    Accessory,
    /// Windshield mount for the device.
    Mount,
    /// The device itself, or an auxiliary interface device.
    Device,
}

impl PartCategory {
    /// The lowercase name used in serialized output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Harness => "harness",
            Self::Tool => "tool",
            Self::Kit => "kit",
            Self::Accessory => "accessory",
            Self::Mount => "mount",
            Self::Device => "device",
        }
    }
}

impl fmt::Display for PartCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable catalog entry describing one physical part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartDescriptor {
    id: PartId,
    name: String,
    category: PartCategory,
    description: String,
    url: Option<String>,
    children: Vec<PartId>,
}

impl PartDescriptor {
    /// Create a descriptor with no description, URL or children.
    #[must_use]
    pub fn new(id: PartId, name: impl Into<String>, category: PartCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            description: String::new(),
            url: None,
            children: Vec::new(),
        }
    }

    /// Set the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the shop URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the ordered list of child part identifiers.
    #[must_use]
    pub fn with_children(mut self, children: Vec<PartId>) -> Self {
        self.children = children;
        self
    }

    /// The part identifier.
    #[must_use]
    pub const fn id(&self) -> &PartId {
        &self.id
    }

    /// The human-readable display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part category.
    #[must_use]
    pub const fn category(&self) -> PartCategory {
        self.category
    }

    /// The free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The shop URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Child part identifiers, in declared order.
    #[must_use]
    pub fn children(&self) -> &[PartId] {
        &self.children
    }

    /// Whether this part is a tool rather than installed hardware.
    #[must_use]
    pub fn is_tool(&self) -> bool {
        self.category == PartCategory::Tool
    }
}
