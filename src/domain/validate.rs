//! Post-assembly checks on a [`VehicleRecord`].

use std::fmt;

use crate::domain::{config::Config, record::VehicleRecord};

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The record is still emitted.
    Warning,
    /// The record is excluded from the output.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A problem found in an assembled record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity.
    pub severity: Severity,
    /// The offending output field.
    pub field: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field,
            message: message.into(),
        }
    }

    /// Whether the issue excludes the record.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}): {}", self.severity, self.field, self.message)
    }
}

/// Check a record.
///
/// Missing identity fields are errors. Implausible mass or wheelbase, and a
/// documented auto-resume value that contradicts the control parameters, are
/// warnings.
#[must_use]
pub fn validate(record: &VehicleRecord, config: &Config) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let identity = &record.identity;

    let required = [
        ("name", Some(identity.name.as_str())),
        ("make", identity.make.as_deref()),
        ("model", identity.model.as_deref()),
        ("car_fingerprint", Some(identity.platform.as_str())),
    ];
    for (field, value) in required {
        if value.is_none_or(|v| v.trim().is_empty()) {
            issues.push(ValidationIssue::error(field, "missing required field"));
        }
    }

    if let Some(mass) = record.capabilities.mass {
        let range = config.mass_range;
        if !range.contains(mass) {
            issues.push(ValidationIssue::warning(
                "mass",
                format!("suspicious mass: {mass} kg (expected {} to {})", range.min, range.max),
            ));
        }
    }

    if let Some(wheelbase) = record.capabilities.wheelbase {
        let range = config.wheelbase_range;
        if !range.contains(wheelbase) {
            issues.push(ValidationIssue::warning(
                "wheelbase",
                format!(
                    "suspicious wheelbase: {wheelbase} m (expected {} to {})",
                    range.min, range.max
                ),
            ));
        }
    }

    let documentation = &record.documentation;
    if let (Some(explicit), Some(derived)) =
        (documentation.auto_resume, documentation.auto_resume_derived)
    {
        if explicit != derived {
            issues.push(ValidationIssue::warning(
                "auto_resume",
                format!("documented as {explicit} but parameters give {derived}"),
            ));
        }
    }

    issues
}
