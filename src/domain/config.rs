use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{platform::SupportType, resolve::CountStrategy};

/// An inclusive range of plausible values for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibleRange {
    /// Smallest plausible value.
    pub min: f64,
    /// Largest plausible value.
    pub max: f64,
}

impl PlausibleRange {
    /// Create a range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether the value lies within the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Configuration for a compilation run.
///
/// This struct holds settings that control which records are emitted, how
/// records are validated, and how hardware is described.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Support tiers left out unless everything is requested.
    excluded_support_types: Vec<SupportType>,

    /// Plausible curb weight, in kg. Records outside it are emitted with a
    /// warning.
    pub mass_range: PlausibleRange,

    /// Plausible wheelbase, in m.
    pub wheelbase_range: PlausibleRange,

    /// Parts whose presence in a bill of materials means the device is
    /// installed on an angled mount.
    angled_mount_parts: Vec<String>,

    /// How part occurrence counts are computed.
    pub part_counting: CountStrategy,

    /// Shop page the hardware "Buy Here" link points to.
    ///
    /// The make and model are appended as query parameters.
    pub shop_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded_support_types: default_excluded_support_types(),
            mass_range: default_mass_range(),
            wheelbase_range: default_wheelbase_range(),
            angled_mount_parts: default_angled_mount_parts(),
            part_counting: CountStrategy::default(),
            shop_url: default_shop_url(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Returns the support tiers excluded from a supported-only run.
    #[must_use]
    pub fn excluded_support_types(&self) -> &[SupportType] {
        &self.excluded_support_types
    }

    /// Checks if a support tier is excluded from a supported-only run.
    #[must_use]
    pub fn is_excluded(&self, support_type: SupportType) -> bool {
        self.excluded_support_types.contains(&support_type)
    }

    /// Returns the part ids that indicate an angled mount.
    #[must_use]
    pub fn angled_mount_parts(&self) -> &[String] {
        &self.angled_mount_parts
    }

    /// Checks if a part id indicates an angled mount.
    #[must_use]
    pub fn is_angled_mount(&self, part: &str) -> bool {
        self.angled_mount_parts.iter().any(|p| p == part)
    }
}

fn default_excluded_support_types() -> Vec<SupportType> {
    vec![SupportType::Community, SupportType::Incompatible]
}

const fn default_mass_range() -> PlausibleRange {
    PlausibleRange::new(500.0, 5000.0)
}

const fn default_wheelbase_range() -> PlausibleRange {
    PlausibleRange::new(1.0, 5.0)
}

fn default_angled_mount_parts() -> Vec<String> {
    vec![
        "angled_mount_8_degrees".to_string(),
        "comma_3x_angled_mount".to_string(),
    ]
}

fn default_shop_url() -> String {
    "https://comma.ai/shop/comma-3x.html".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_excluded_support_types")]
        excluded_support_types: Vec<SupportType>,

        #[serde(default = "default_mass_range")]
        mass_range: PlausibleRange,

        #[serde(default = "default_wheelbase_range")]
        wheelbase_range: PlausibleRange,

        #[serde(default = "default_angled_mount_parts")]
        angled_mount_parts: Vec<String>,

        /// `flat` or `distinct`.
        #[serde(default)]
        part_counting: CountStrategy,

        #[serde(default = "default_shop_url")]
        shop_url: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                excluded_support_types,
                mass_range,
                wheelbase_range,
                angled_mount_parts,
                part_counting,
                shop_url,
            } => Self {
                excluded_support_types,
                mass_range,
                wheelbase_range,
                angled_mount_parts,
                part_counting,
                shop_url,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            excluded_support_types: config.excluded_support_types,
            mass_range: config.mass_range,
            wheelbase_range: config.wheelbase_range,
            angled_mount_parts: config.angled_mount_parts,
            part_counting: config.part_counting,
            shop_url: config.shop_url,
        }
    }
}
