//! Footnotes attached to documentation table columns.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// A column of the public compatibility table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Column {
    /// Vehicle make.
    Make,
    /// Vehicle model and years.
    Model,
    /// Required trim package.
    Package,
    /// Adaptive cruise control.
    Longitudinal,
    /// Minimum speed for longitudinal control.
    FsrLongitudinal,
    /// Minimum speed for lateral control.
    FsrSteering,
    /// Steering torque rating.
    SteeringTorque,
    /// Resume from standstill.
    AutoResume,
    /// Hardware needed for installation.
    Hardware,
    /// Installation video.
    Video,
}

impl Column {
    /// All columns, in table order.
    pub const ALL: [Self; 10] = [
        Self::Make,
        Self::Model,
        Self::Package,
        Self::Longitudinal,
        Self::FsrLongitudinal,
        Self::FsrSteering,
        Self::SteeringTorque,
        Self::AutoResume,
        Self::Hardware,
        Self::Video,
    ];

    /// The column header shown in the rendered table.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Make => "Make",
            Self::Model => "Model",
            Self::Package => "Supported Package",
            Self::Longitudinal => "ACC",
            Self::FsrLongitudinal => "No ACC accel below",
            Self::FsrSteering => "No ALC below",
            Self::SteeringTorque => "Steering Torque",
            Self::AutoResume => "Resume from stop",
            Self::Hardware => "Hardware Needed",
            Self::Video => "Video",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// The text of a footnote and the columns it annotates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteDefinition {
    /// Footnote text. May contain inline HTML.
    pub text: String,
    /// Columns the footnote is attached to.
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl FootnoteDefinition {
    /// Create a definition.
    #[must_use]
    pub fn new(text: impl Into<String>, columns: impl Into<Vec<Column>>) -> Self {
        Self {
            text: text.into(),
            columns: columns.into(),
        }
    }

    /// Whether the footnote annotates the given column.
    #[must_use]
    pub fn applies_to(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }
}

/// Footnote definitions keyed by footnote id.
///
/// Iteration is in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FootnoteCollection(BTreeMap<String, FootnoteDefinition>);

impl FootnoteCollection {
    /// An empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a definition, replacing any previous one with the same id.
    ///
    /// Returns the replaced definition.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        definition: FootnoteDefinition,
    ) -> Option<FootnoteDefinition> {
        self.0.insert(id.into(), definition)
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FootnoteDefinition> {
        self.0.get(id)
    }

    /// Whether the collection has a definition for the id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Footnotes annotating the given column.
    pub fn for_column(&self, column: Column) -> impl Iterator<Item = (&str, &FootnoteDefinition)> {
        self.iter().filter(move |(_, def)| def.applies_to(column))
    }

    /// Iterate over `(id, definition)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FootnoteDefinition)> {
        self.0.iter().map(|(id, def)| (id.as_str(), def))
    }

    /// Iterate over footnote ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of footnotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no footnotes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FootnoteDefinition)> for FootnoteCollection {
    fn from_iter<T: IntoIterator<Item = (K, FootnoteDefinition)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Extend<(String, FootnoteDefinition)> for FootnoteCollection {
    fn extend<T: IntoIterator<Item = (String, FootnoteDefinition)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}
