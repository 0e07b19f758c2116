//! The output record and its assembly from normalized fields, rule
//! derivations and the resolved bill of materials.

use std::{collections::BTreeMap, fmt::Write as _};

use serde::{Deserialize, Serialize};

use crate::domain::{
    catalog::{CatalogError, PartCatalog},
    config::Config,
    footnote::{FootnoteCollection, FootnoteDefinition},
    part::{PartCategory, PartDescriptor},
    platform::SupportType,
    resolve::{self, BillOfMaterials, ResolvedPart},
    rules::Derivation,
    units::MS_TO_MPH,
};

/// Lateral acceleration, in m/s², at or above which steering torque is rated
/// full.
pub const GOOD_TORQUE_THRESHOLD: f64 = 1.8;

/// A three-level rating shown in the compatibility table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Star {
    /// Fully supported.
    Full,
    /// Partially supported.
    Half,
    /// Not supported.
    Empty,
}

/// Which vehicle a record describes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Full display name.
    pub name: String,
    /// Vehicle make.
    pub make: Option<String>,
    /// Vehicle model.
    pub model: Option<String>,
    /// Model years as written.
    pub years: Option<String>,
    /// Every model year covered.
    pub year_list: Vec<u16>,
    /// Platform identifier.
    #[serde(rename = "car_fingerprint")]
    pub platform: String,
    /// Brand key.
    pub brand: String,
}

/// How well a vehicle is supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Support {
    /// Support tier.
    pub support_type: SupportType,
    /// Link to the tier description.
    pub support_link: String,
    /// Free-text detail sentence.
    pub detail_sentence: Option<String>,
}

/// Human-authored documentation facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Documentation {
    /// Required trim package.
    pub package: Option<String>,
    /// Extra requirements.
    pub requirements: Option<String>,
    /// Review video.
    pub video: Option<String>,
    /// Installation video.
    pub setup_video: Option<String>,
    /// Footnote texts, explicit references first.
    pub footnotes: Vec<String>,
    /// Every footnote by id with its columns.
    pub footnote_details: FootnoteCollection,
    /// Minimum steering speed, m/s. `None` means no lower bound.
    pub min_steer_speed: Option<f64>,
    /// Minimum engagement speed, m/s. `None` means no lower bound.
    pub min_enable_speed: Option<f64>,
    /// Whether the car resumes from a stop.
    pub auto_resume: Option<bool>,
    /// The resume-from-stop value computed from the control parameters.
    pub auto_resume_derived: Option<bool>,
    /// Whether the entry is merged into the public table.
    pub merged: bool,
}

/// Rendered table cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Adaptive cruise rating.
    pub longitudinal: Star,
    /// Speed below which longitudinal control is unavailable.
    pub fsr_longitudinal: String,
    /// Speed below which lateral control is unavailable.
    pub fsr_steering: String,
    /// Steering torque rating.
    pub steering_torque: Star,
    /// Resume-from-stop rating.
    pub auto_resume_star: Star,
    /// Video link, or empty.
    pub video_row: String,
}

/// One line of a bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartLine {
    /// Number of occurrences.
    pub count: usize,
    /// Display name.
    pub name: String,
    /// Part category.
    #[serde(rename = "type")]
    pub category: PartCategory,
    /// Part identifier.
    #[serde(rename = "enum_name")]
    pub id: String,
}

impl From<&ResolvedPart<'_>> for PartLine {
    fn from(entry: &ResolvedPart<'_>) -> Self {
        Self {
            count: entry.count,
            name: entry.part.name().to_string(),
            category: entry.part.category(),
            id: entry.part.id().to_string(),
        }
    }
}

/// Installation hardware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Hardware {
    /// Display names of the explicit parts.
    pub car_parts: Vec<String>,
    /// Id of the harness, if any.
    pub harness: Option<String>,
    /// Whether the device sits on an angled mount.
    pub has_angled_mount: bool,
    /// Resolved parts, by name.
    pub detailed_parts: Vec<PartLine>,
    /// Resolved tools, by name.
    pub tools_required: Vec<PartLine>,
    /// HTML snippet for the hardware column.
    pub hardware: String,
}

/// Numeric and boolean capabilities from the parameter and spec registries.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Capabilities {
    pub mass: Option<f64>,
    pub mass_curb_weight: Option<f64>,
    pub wheelbase: Option<f64>,
    pub steer_ratio: Option<f64>,
    pub center_to_front_ratio: f64,
    pub center_to_front_ratio_base: Option<f64>,
    pub max_lateral_accel: Option<f64>,

    pub network_location: Option<String>,
    pub bus_lookup: Option<BTreeMap<String, String>>,
    pub radar_delay: Option<f64>,
    pub wheel_speed_factor: Option<f64>,

    pub start_accel: Option<f64>,
    pub min_steer_speed_base: Option<f64>,
    pub min_enable_speed_base: Option<f64>,

    pub steer_control_type: Option<String>,
    pub steer_actuator_delay: Option<f64>,
    pub steer_ratio_rear: Option<f64>,
    pub steer_limit_timer: Option<f64>,

    pub tire_stiffness_factor: Option<f64>,
    pub tire_stiffness_factor_base: Option<f64>,
    pub tire_stiffness_front: Option<f64>,
    pub tire_stiffness_rear: Option<f64>,
    pub rotational_inertia: Option<f64>,

    pub experimental_longitudinal_available: Option<bool>,
    pub openpilot_longitudinal_control: Option<bool>,
    pub dashcam_only: Option<bool>,
    pub enable_dsu: Option<bool>,
    pub enable_bsm: Option<bool>,
    pub pcm_cruise: Option<bool>,
    pub flags: u64,
    pub auto_resume_sng: Option<bool>,
    #[serde(rename = "radarUnavailable")]
    pub radar_unavailable: Option<bool>,
    pub passive: Option<bool>,

    pub stopping_decel_rate: Option<f64>,
    #[serde(rename = "vEgo_stopping")]
    pub v_ego_stopping: Option<f64>,
    #[serde(rename = "vEgo_starting")]
    pub v_ego_starting: Option<f64>,
    pub stop_accel: Option<f64>,
    pub longitudinal_actuator_delay: Option<f64>,
}

/// The reconciled fields of one documentation entry, before derivation and
/// part resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    /// Identity group.
    pub identity: Identity,
    /// Support group.
    pub support: Support,
    /// Documentation group. Footnotes are filled in during assembly.
    pub documentation: Documentation,
    /// Capability group.
    pub capabilities: Capabilities,
    /// Explicitly referenced footnotes, in reference order.
    pub footnotes: Vec<(String, FootnoteDefinition)>,
    /// Explicit part ids, in declared order.
    pub parts: Vec<String>,
}

/// One normalized documentation record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRecord {
    /// Identity group.
    #[serde(flatten)]
    pub identity: Identity,
    /// Support group.
    #[serde(flatten)]
    pub support: Support,
    /// Documentation group.
    #[serde(flatten)]
    pub documentation: Documentation,
    /// Table row group.
    #[serde(flatten)]
    pub row: TableRow,
    /// Hardware group.
    #[serde(flatten)]
    pub hardware: Hardware,
    /// Capability group.
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

impl VehicleRecord {
    /// Sort key: make then model, missing values first.
    #[must_use]
    pub fn sort_key(&self) -> (&str, &str) {
        (
            self.identity.make.as_deref().unwrap_or_default(),
            self.identity.model.as_deref().unwrap_or_default(),
        )
    }
}

/// Sort records by make then model. The sort is stable.
pub fn sort_records(records: &mut [VehicleRecord]) {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Merges normalized fields with a derivation and the resolved hardware.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    catalog: &'a PartCatalog,
    config: &'a Config,
}

impl<'a> Assembler<'a> {
    /// Create an assembler.
    #[must_use]
    pub const fn new(catalog: &'a PartCatalog, config: &'a Config) -> Self {
        Self { catalog, config }
    }

    /// Build the record.
    ///
    /// Derived extra parts are appended to the explicit part list before
    /// resolution. Where an explicit and a derived footnote share an id, the
    /// explicit one is kept. Unknown explicit part ids are dropped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if resolution fails, which indicates a
    /// broken catalog.
    pub fn assemble(
        &self,
        fields: NormalizedFields,
        derivation: &Derivation,
    ) -> Result<VehicleRecord, CatalogError> {
        let NormalizedFields {
            identity,
            support,
            mut documentation,
            capabilities,
            footnotes,
            parts,
        } = fields;

        let (mut explicit, missing) = resolve::lookup(self.catalog, &parts);
        for id in missing {
            tracing::warn!("{}: unknown part '{id}' ignored", identity.name);
        }
        for extra in &derivation.extra_parts {
            if explicit.iter().any(|part| part.id() == extra) {
                continue;
            }
            match self.catalog.get(extra) {
                Some(part) => explicit.push(part),
                None => return Err(CatalogError::UnknownPart(extra.to_string())),
            }
        }

        let bill = resolve::resolve(self.catalog, &explicit, self.config.part_counting)?;
        let hardware = self.hardware(&identity, &explicit, &bill);

        let (texts, details) = merge_footnotes(footnotes, &derivation.footnotes);
        documentation.footnotes = texts;
        documentation.footnote_details = details;

        let row = table_row(&documentation, &capabilities);

        Ok(VehicleRecord {
            identity,
            support,
            documentation,
            row,
            hardware,
            capabilities,
        })
    }

    fn hardware(
        &self,
        identity: &Identity,
        explicit: &[&PartDescriptor],
        bill: &BillOfMaterials<'_>,
    ) -> Hardware {
        if explicit.is_empty() {
            return Hardware::default();
        }

        let detailed_parts: Vec<PartLine> =
            bill.parts_by_name().iter().map(PartLine::from).collect();
        let tools_required: Vec<PartLine> =
            bill.tools_by_name().iter().map(PartLine::from).collect();
        let html = self.hardware_html(identity, &detailed_parts, &tools_required);

        Hardware {
            car_parts: explicit.iter().map(|part| part.name().to_string()).collect(),
            harness: explicit
                .iter()
                .rev()
                .find(|part| part.category() == PartCategory::Harness)
                .map(|part| part.id().to_string()),
            has_angled_mount: bill
                .iter()
                .any(|entry| self.config.is_angled_mount(entry.part.id())),
            detailed_parts,
            tools_required,
            hardware: html,
        }
    }

    fn hardware_html(&self, identity: &Identity, parts: &[PartLine], tools: &[PartLine]) -> String {
        let make = identity.make.as_deref().unwrap_or_default();
        let mut model = identity.model.clone().unwrap_or_default();
        if let Some(years) = &identity.years {
            model.push(' ');
            model.push_str(years);
        }
        let buy_link = format!(
            r#"<a href="{}?make={make}&model={model}">Buy Here</a>"#,
            self.config.shop_url
        );

        let mut html = format!(
            "<details><summary>Parts</summary><sub>{}<br>{buy_link}</sub></details>",
            bullet_list(parts)
        );
        if !tools.is_empty() {
            let _ = write!(
                html,
                "<details><summary>Tools</summary><sub>{}</sub></details>",
                bullet_list(tools)
            );
        }
        html
    }
}

fn bullet_list(lines: &[PartLine]) -> String {
    lines
        .iter()
        .map(|line| format!("- {} {}", line.count, line.name))
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Combine explicit footnotes with derived ones. Explicit references keep
/// their order and win on id collisions; derived footnotes follow in id
/// order.
fn merge_footnotes(
    explicit: Vec<(String, FootnoteDefinition)>,
    derived: &FootnoteCollection,
) -> (Vec<String>, FootnoteCollection) {
    let mut texts = Vec::with_capacity(explicit.len() + derived.len());
    let mut details = FootnoteCollection::new();

    for (id, definition) in explicit {
        texts.push(definition.text.clone());
        details.insert(id, definition);
    }
    for (id, definition) in derived.iter() {
        if details.contains(id) {
            tracing::debug!("Derived footnote '{id}' shadowed by explicit reference");
            continue;
        }
        texts.push(definition.text.clone());
        details.insert(id, definition.clone());
    }

    (texts, details)
}

fn table_row(documentation: &Documentation, capabilities: &Capabilities) -> TableRow {
    let experimental = capabilities.experimental_longitudinal_available == Some(true);
    let longitudinal = if experimental {
        Star::Half
    } else if capabilities.openpilot_longitudinal_control == Some(true) {
        Star::Full
    } else {
        Star::Empty
    };

    let steering_torque = match capabilities.max_lateral_accel {
        Some(accel) if accel >= GOOD_TORQUE_THRESHOLD => Star::Full,
        Some(_) => Star::Half,
        None => Star::Empty,
    };

    TableRow {
        longitudinal,
        fsr_longitudinal: mph(documentation.min_enable_speed),
        fsr_steering: mph(documentation.min_steer_speed),
        steering_torque,
        auto_resume_star: if documentation.auto_resume == Some(true) {
            Star::Full
        } else {
            Star::Empty
        },
        video_row: documentation.video.clone().unwrap_or_default(),
    }
}

/// Format a speed in m/s as whole miles per hour. Missing or non-positive
/// speeds are "0 mph".
fn mph(speed: Option<f64>) -> String {
    match speed {
        Some(speed) if speed > 0.0 => format!("{:.0} mph", speed * MS_TO_MPH),
        _ => "0 mph".to_string(),
    }
}
