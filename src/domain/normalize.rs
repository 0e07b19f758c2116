//! Reconciles documentation facts, control parameters and base specs into
//! one flat field set.

use crate::domain::{
    brand::BrandRules,
    footnote::{FootnoteCollection, FootnoteDefinition},
    name::{ModelName, ModelYears},
    platform::{DocEntry, PlatformParams, PlatformSpecs},
    record::{Capabilities, Documentation, Identity, NormalizedFields, Support},
    rules::CapabilityFlags,
};

/// Centre of gravity ratio used when it cannot be computed.
pub const DEFAULT_CENTER_TO_FRONT_RATIO: f64 = 0.5;

/// Map an infinite bound to `None`. Finite values pass through unchanged.
#[must_use]
pub fn bound(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// The "comma body" has no minimum steering speed; upstream spells this as
/// negative infinity.
#[must_use]
pub fn comma_body_min_steer_speed(name: &str, speed: Option<f64>) -> Option<f64> {
    if name.eq_ignore_ascii_case("comma body") && speed == Some(f64::NEG_INFINITY) {
        None
    } else {
        speed
    }
}

/// `center_to_front / wheelbase`, or [`DEFAULT_CENTER_TO_FRONT_RATIO`] when
/// either is missing or the wheelbase is not a positive finite number.
#[must_use]
pub fn center_to_front_ratio(center_to_front: Option<f64>, wheelbase: Option<f64>) -> f64 {
    match (center_to_front, wheelbase) {
        (Some(center), Some(wheelbase)) if wheelbase.is_finite() && wheelbase > 0.0 => {
            center / wheelbase
        }
        _ => DEFAULT_CENTER_TO_FRONT_RATIO,
    }
}

/// Resume from standstill: stop-and-go capable and engaging from zero.
/// A missing minimum engagement speed counts as zero.
#[must_use]
pub fn derive_auto_resume(
    auto_resume_sng: Option<bool>,
    min_enable_speed: Option<f64>,
) -> Option<bool> {
    auto_resume_sng.map(|sng| sng && min_enable_speed.unwrap_or(0.0) <= 0.0)
}

/// Normalizes the documentation entries of one platform.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    platform: &'a str,
    brand: &'a str,
    rules: &'a BrandRules,
    flags: CapabilityFlags,
    params: Option<&'a PlatformParams>,
    specs: Option<&'a PlatformSpecs>,
}

impl<'a> Normalizer<'a> {
    /// Create a normalizer for one platform of the given brand.
    #[must_use]
    pub const fn new(
        platform: &'a str,
        brand: &'a str,
        rules: &'a BrandRules,
        flags: CapabilityFlags,
    ) -> Self {
        Self {
            platform,
            brand,
            rules,
            flags,
            params: None,
            specs: None,
        }
    }

    /// Set the control parameters.
    #[must_use]
    pub const fn with_params(mut self, params: Option<&'a PlatformParams>) -> Self {
        self.params = params;
        self
    }

    /// Set the base specs.
    #[must_use]
    pub const fn with_specs(mut self, specs: Option<&'a PlatformSpecs>) -> Self {
        self.specs = specs;
        self
    }

    /// Normalize one documentation entry.
    ///
    /// Missing upstream values degrade to `None`. Unknown footnote references
    /// are dropped with a warning.
    #[must_use]
    pub fn normalize(&self, doc: &DocEntry) -> NormalizedFields {
        let identity = self.identity(doc);
        let documentation = self.documentation(doc);
        let capabilities = self.capabilities();

        NormalizedFields {
            identity,
            support: Support {
                support_type: doc.support_type,
                support_link: doc
                    .support_link
                    .clone()
                    .unwrap_or_else(|| doc.support_type.link().to_string()),
                detail_sentence: doc.detail_sentence.clone(),
            },
            documentation,
            capabilities,
            footnotes: self.footnotes(doc),
            parts: doc.parts.clone(),
        }
    }

    fn identity(&self, doc: &DocEntry) -> Identity {
        let split = doc
            .name
            .parse::<ModelName>()
            .inspect_err(|e| {
                if doc.make.is_none() || doc.model.is_none() {
                    tracing::warn!("{}: {e}", doc.name);
                }
            })
            .ok();

        let years = match &doc.years {
            Some(text) => text
                .parse::<ModelYears>()
                .inspect_err(|e| tracing::warn!("{}: {e}", doc.name))
                .ok(),
            None => split.as_ref().and_then(|s| s.years.clone()),
        };

        Identity {
            name: doc.name.clone(),
            make: doc.make.clone().or_else(|| split.as_ref().map(|s| s.make.clone())),
            model: doc.model.clone().or_else(|| split.as_ref().map(|s| s.model.clone())),
            years: doc
                .years
                .clone()
                .or_else(|| years.as_ref().map(|y| y.as_str().to_string())),
            year_list: years.map(|y| y.to_vec()).unwrap_or_default(),
            platform: self.platform.to_string(),
            brand: self.brand.to_string(),
        }
    }

    fn documentation(&self, doc: &DocEntry) -> Documentation {
        let params = self.params;
        let min_steer_speed = doc
            .min_steer_speed
            .or_else(|| params.and_then(|p| p.min_steer_speed));
        let min_enable_speed = doc
            .min_enable_speed
            .or_else(|| params.and_then(|p| p.min_enable_speed));

        let auto_resume_derived =
            derive_auto_resume(params.and_then(|p| p.auto_resume_sng), min_enable_speed);

        Documentation {
            package: doc.package.clone(),
            requirements: doc.requirements.clone(),
            video: doc.video.clone(),
            setup_video: doc.setup_video.clone(),
            footnotes: Vec::new(),
            footnote_details: FootnoteCollection::new(),
            min_steer_speed: bound(comma_body_min_steer_speed(&doc.name, min_steer_speed)),
            min_enable_speed: bound(min_enable_speed),
            auto_resume: doc.auto_resume.or(auto_resume_derived),
            auto_resume_derived,
            merged: doc.merged,
        }
    }

    fn footnotes(&self, doc: &DocEntry) -> Vec<(String, FootnoteDefinition)> {
        let mut resolved: Vec<(String, _)> = Vec::with_capacity(doc.footnotes.len());
        for id in &doc.footnotes {
            if resolved.iter().any(|(seen, _)| seen == id) {
                continue;
            }
            match self.rules.footnotes().get(id) {
                Some(definition) => resolved.push((id.clone(), definition.clone())),
                None => tracing::warn!("{}: unknown footnote '{id}' dropped", doc.name),
            }
        }
        resolved
    }

    fn capabilities(&self) -> Capabilities {
        let p = self.params.cloned().unwrap_or_default();
        let s = self.specs.cloned().unwrap_or_default();

        Capabilities {
            mass: p.mass,
            mass_curb_weight: s.mass,
            wheelbase: p.wheelbase,
            steer_ratio: p.steer_ratio,
            center_to_front_ratio: center_to_front_ratio(p.center_to_front, p.wheelbase),
            center_to_front_ratio_base: s.center_to_front_ratio,
            max_lateral_accel: bound(p.max_lateral_accel),

            network_location: p.network_location,
            bus_lookup: self.specs.is_some().then_some(s.bus_lookup),
            radar_delay: p.radar_delay,
            wheel_speed_factor: p.wheel_speed_factor,

            start_accel: p.start_accel,
            min_steer_speed_base: bound(s.min_steer_speed),
            min_enable_speed_base: bound(s.min_enable_speed),

            steer_control_type: p.steer_control_type,
            steer_actuator_delay: p.steer_actuator_delay,
            steer_ratio_rear: p.steer_ratio_rear,
            steer_limit_timer: p.steer_limit_timer,

            tire_stiffness_factor: p.tire_stiffness_factor,
            tire_stiffness_factor_base: s.tire_stiffness_factor,
            tire_stiffness_front: p.tire_stiffness_front,
            tire_stiffness_rear: p.tire_stiffness_rear,
            rotational_inertia: p.rotational_inertia,

            experimental_longitudinal_available: p.experimental_longitudinal_available,
            openpilot_longitudinal_control: p.openpilot_longitudinal_control,
            dashcam_only: p.dashcam_only,
            enable_dsu: p.enable_dsu,
            enable_bsm: p.enable_bsm,
            pcm_cruise: p.pcm_cruise,
            flags: self.flags.bits(),
            auto_resume_sng: p.auto_resume_sng,
            radar_unavailable: p.radar_unavailable,
            passive: p.passive,

            stopping_decel_rate: p.stopping_decel_rate,
            v_ego_stopping: p.v_ego_stopping,
            v_ego_starting: p.v_ego_starting,
            stop_accel: p.stop_accel,
            longitudinal_actuator_delay: p.longitudinal_actuator_delay,
        }
    }
}
