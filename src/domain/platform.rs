//! Platform descriptors: the per-platform input read from the source
//! directory.
//!
//! A descriptor bundles the three upstream sources for one platform: control
//! parameters, base specs and the documentation entries (one per trim or
//! year range).

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::domain::{
    brand::BrandRules,
    rules::CapabilityFlags,
    units,
};

/// Support tier of a documented vehicle.
///
/// Serialized with its display name. Descriptor files may use either the
/// display name or the short lowercase key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SupportType {
    /// Maintained upstream, plug-and-play.
    #[default]
    #[serde(rename = "Upstream", alias = "upstream")]
    Upstream,
    /// Planned for support after safety validation.
    #[serde(rename = "Under review", alias = "review", alias = "under_review")]
    Review,
    /// Dashcam only.
    #[serde(rename = "Dashcam mode", alias = "dashcam")]
    Dashcam,
    /// Available in a community fork.
    #[serde(rename = "Community", alias = "community")]
    Community,
    /// Upstream, but needs a custom install.
    #[serde(rename = "Custom", alias = "custom")]
    Custom,
    /// Known fundamental incompatibility.
    #[serde(rename = "Not compatible", alias = "incompatible", alias = "not_compatible")]
    Incompatible,
}

impl SupportType {
    /// Human-readable tier name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Upstream => "Upstream",
            Self::Review => "Under review",
            Self::Dashcam => "Dashcam mode",
            Self::Community => "Community",
            Self::Custom => "Custom",
            Self::Incompatible => "Not compatible",
        }
    }

    /// Default anchor link to the tier's description.
    #[must_use]
    pub const fn link(self) -> &'static str {
        match self {
            Self::Upstream => "#upstream",
            Self::Review => "#under-review",
            Self::Dashcam => "#dashcam",
            Self::Community => "#community",
            Self::Custom => "#custom",
            Self::Incompatible => "#incompatible",
        }
    }
}

impl fmt::Display for SupportType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Capability flags as written in a descriptor: a raw bitset or flag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagSpec {
    /// Raw bitset.
    Bits(u64),
    /// Names looked up in the brand's flag table.
    Names(Vec<String>),
}

impl Default for FlagSpec {
    fn default() -> Self {
        Self::Bits(0)
    }
}

impl FlagSpec {
    /// Resolve to a bitset, returning any flag names the brand does not
    /// define.
    #[must_use]
    pub fn resolve(&self, brand: &BrandRules) -> (CapabilityFlags, Vec<String>) {
        match self {
            Self::Bits(bits) => (CapabilityFlags::from_bits(*bits), Vec::new()),
            Self::Names(names) => brand.flags_from_names(names),
        }
    }
}

/// One platform and its documentation entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Platform identifier, e.g. `HYUNDAI_SONATA`.
    #[serde(default)]
    pub platform: String,
    /// Brand key used to select the rule table.
    #[serde(default)]
    pub brand: String,
    /// Capability flags.
    #[serde(default)]
    pub flags: FlagSpec,
    /// Control parameters. Absent when the registry has no entry.
    #[serde(default)]
    pub params: Option<PlatformParams>,
    /// Base specs.
    #[serde(default)]
    pub specs: Option<PlatformSpecs>,
    /// Documentation entries, one per trim or year range.
    #[serde(default)]
    pub docs: Vec<DocEntry>,
}

/// Control parameters of a platform.
///
/// Every field is optional; missing values degrade to `null` in the output.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformParams {
    #[serde(deserialize_with = "units::number")]
    pub mass: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub wheelbase: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub center_to_front: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub steer_ratio: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub steer_ratio_rear: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub max_lateral_accel: Option<f64>,

    #[serde(deserialize_with = "units::speed")]
    pub min_steer_speed: Option<f64>,
    #[serde(deserialize_with = "units::speed")]
    pub min_enable_speed: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub start_accel: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub stop_accel: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub stopping_decel_rate: Option<f64>,
    #[serde(deserialize_with = "units::speed")]
    pub v_ego_stopping: Option<f64>,
    #[serde(deserialize_with = "units::speed")]
    pub v_ego_starting: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub longitudinal_actuator_delay: Option<f64>,

    pub network_location: Option<String>,
    #[serde(deserialize_with = "units::number")]
    pub radar_delay: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub wheel_speed_factor: Option<f64>,

    pub steer_control_type: Option<String>,
    #[serde(deserialize_with = "units::number")]
    pub steer_actuator_delay: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub steer_limit_timer: Option<f64>,

    #[serde(deserialize_with = "units::number")]
    pub tire_stiffness_factor: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub tire_stiffness_front: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub tire_stiffness_rear: Option<f64>,
    #[serde(deserialize_with = "units::number")]
    pub rotational_inertia: Option<f64>,

    pub experimental_longitudinal_available: Option<bool>,
    pub openpilot_longitudinal_control: Option<bool>,
    pub dashcam_only: Option<bool>,
    pub enable_dsu: Option<bool>,
    pub enable_bsm: Option<bool>,
    pub pcm_cruise: Option<bool>,
    pub auto_resume_sng: Option<bool>,
    pub radar_unavailable: Option<bool>,
    pub passive: Option<bool>,
}

/// Base specs of a platform, before tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSpecs {
    /// Curb weight in kg.
    #[serde(deserialize_with = "units::number")]
    pub mass: Option<f64>,
    /// Wheelbase in m.
    #[serde(deserialize_with = "units::number")]
    pub wheelbase: Option<f64>,
    /// Centre of gravity position as a fraction of the wheelbase.
    #[serde(deserialize_with = "units::number")]
    pub center_to_front_ratio: Option<f64>,
    /// Base minimum steering speed, m/s.
    #[serde(deserialize_with = "units::speed")]
    pub min_steer_speed: Option<f64>,
    /// Base minimum engagement speed, m/s.
    #[serde(deserialize_with = "units::speed")]
    pub min_enable_speed: Option<f64>,
    /// Base tire stiffness factor.
    #[serde(deserialize_with = "units::number")]
    pub tire_stiffness_factor: Option<f64>,
    /// Message database per bus.
    pub bus_lookup: BTreeMap<String, String>,
}

/// Human-authored documentation facts for one trim or year range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocEntry {
    /// Full display name, e.g. `"Honda Civic 2016-18"`.
    pub name: String,
    /// Make. Split from the name when absent.
    pub make: Option<String>,
    /// Model. Split from the name when absent.
    pub model: Option<String>,
    /// Model years as written. Split from the name when absent.
    pub years: Option<String>,
    /// Required trim package.
    pub package: Option<String>,
    /// Extra requirements text.
    pub requirements: Option<String>,
    /// Review video link.
    pub video: Option<String>,
    /// Installation video link.
    pub setup_video: Option<String>,
    /// Footnote ids, resolved against the brand's footnote table.
    pub footnotes: Vec<String>,
    /// Explicit part ids.
    pub parts: Vec<String>,
    /// Minimum steering speed, m/s.
    #[serde(deserialize_with = "units::speed")]
    pub min_steer_speed: Option<f64>,
    /// Minimum engagement speed, m/s.
    #[serde(deserialize_with = "units::speed")]
    pub min_enable_speed: Option<f64>,
    /// Whether the car resumes from a stop. Derived when absent.
    pub auto_resume: Option<bool>,
    /// Whether this entry is merged into the public table.
    #[serde(default = "default_merged")]
    pub merged: bool,
    /// Support tier.
    pub support_type: SupportType,
    /// Support link. Defaults to the tier's anchor.
    pub support_link: Option<String>,
    /// Free-text detail sentence.
    pub detail_sentence: Option<String>,
}

const fn default_merged() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::brand::BrandRegistry;

    const SONATA: &str = r"
platform: HYUNDAI_SONATA
brand: hyundai
flags: [MANDO_RADAR]
params:
  mass: 1513
  wheelbase: 2.84
  center_to_front: 1.136
  max_lateral_accel: inf
  auto_resume_sng: true
specs:
  center_to_front_ratio: 0.4
  min_steer_speed: 0
  bus_lookup:
    pt: hyundai_kia_generic
docs:
  - name: Hyundai Sonata 2020-23
    package: All
    footnotes: [radar_scc]
    parts: [comma_3x, hyundai_a]
    min_steer_speed: 32 mph
    support_type: upstream
";

    #[test]
    fn parses_yaml_descriptor() {
        let descriptor: PlatformDescriptor = serde_yaml::from_str(SONATA).unwrap();

        assert_eq!(descriptor.platform, "HYUNDAI_SONATA");
        assert_eq!(descriptor.flags, FlagSpec::Names(vec!["MANDO_RADAR".to_string()]));

        let params = descriptor.params.unwrap();
        assert_eq!(params.mass, Some(1513.0));
        assert_eq!(params.max_lateral_accel, Some(f64::INFINITY));
        assert_eq!(params.steer_ratio, None);

        let specs = descriptor.specs.unwrap();
        assert_eq!(specs.bus_lookup["pt"], "hyundai_kia_generic");

        let doc = &descriptor.docs[0];
        assert_eq!(doc.parts, vec!["comma_3x", "hyundai_a"]);
        assert!((doc.min_steer_speed.unwrap() - 32.0 * units::MPH_TO_MS).abs() < 1e-9);
        assert_eq!(doc.support_type, SupportType::Upstream);
        assert!(doc.merged);
    }

    #[test]
    fn parses_json_descriptor_with_integer_flags() {
        let descriptor: PlatformDescriptor = serde_json::from_str(
            r#"{"platform": "HONDA_CIVIC", "brand": "honda", "flags": 6, "docs": [{"name": "Honda Civic 2016-18"}]}"#,
        )
        .unwrap();

        assert_eq!(descriptor.flags, FlagSpec::Bits(6));
        assert!(descriptor.params.is_none());
        assert_eq!(descriptor.docs[0].support_type, SupportType::Upstream);
    }

    #[test]
    fn flag_names_resolve_through_brand() {
        let registry = BrandRegistry::standard().unwrap();
        let hyundai = registry.get("hyundai");

        let (flags, unknown) =
            FlagSpec::Names(vec!["CANFD".into(), "WARP_DRIVE".into()]).resolve(hyundai);

        assert_eq!(flags.bits(), hyundai.flag("CANFD").unwrap());
        assert_eq!(unknown, vec!["WARP_DRIVE".to_string()]);
    }

    #[test_case("upstream", SupportType::Upstream; "short key")]
    #[test_case("Under review", SupportType::Review; "display name")]
    #[test_case("not_compatible", SupportType::Incompatible; "snake case")]
    #[test_case("Dashcam mode", SupportType::Dashcam; "dashcam")]
    fn support_type_accepts_keys_and_names(input: &str, expected: SupportType) {
        let parsed: SupportType = serde_json::from_value(serde_json::Value::from(input)).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn support_type_serializes_display_name() {
        let json = serde_json::to_string(&SupportType::Incompatible).unwrap();
        assert_eq!(json, "\"Not compatible\"");
        assert_eq!(SupportType::Review.link(), "#under-review");
    }
}
