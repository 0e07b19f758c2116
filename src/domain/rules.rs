//! Flag-driven derivation of footnotes and required parts.
//!
//! A [`RuleTable`] is plain data: an unconditional set of base footnotes and
//! an ordered list of [`FlagRule`]s. [`RuleTable::derive`] evaluates it
//! against a platform's [`CapabilityFlags`].

use std::ops::BitOr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    catalog::PartCatalog,
    footnote::{FootnoteCollection, FootnoteDefinition},
    part::{InvalidPartIdError, PartId},
};

/// A platform's brand-specific capability bitset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityFlags(u64);

impl CapabilityFlags {
    /// No flags set.
    pub const EMPTY: Self = Self(0);

    /// Wrap a raw bitset.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bitset.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every bit of `mask` is set.
    #[must_use]
    pub const fn contains(self, mask: u64) -> bool {
        self.0 & mask == mask
    }
}

impl BitOr for CapabilityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<u64> for CapabilityFlags {
    type Output = Self;

    fn bitor(self, rhs: u64) -> Self::Output {
        Self(self.0 | rhs)
    }
}

/// The condition under which a rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagCondition {
    /// The bit (or bits) are all set.
    Set(u64),
    /// At least one of the bits is clear.
    Clear(u64),
    /// Every bit of `set` is set and no bit of `clear` is.
    Masked {
        /// Bits that must be set.
        set: u64,
        /// Bits that must be clear.
        clear: u64,
    },
}

impl FlagCondition {
    /// Evaluate the condition.
    #[must_use]
    pub const fn matches(self, flags: CapabilityFlags) -> bool {
        match self {
            Self::Set(mask) => flags.contains(mask),
            Self::Clear(mask) => !flags.contains(mask),
            Self::Masked { set, clear } => flags.contains(set) && flags.bits() & clear == 0,
        }
    }
}

/// One entry of a brand's rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRule {
    condition: FlagCondition,
    footnote: Option<(String, FootnoteDefinition)>,
    required_part: Option<PartId>,
}

impl FlagRule {
    /// A rule firing when `mask` is set.
    #[must_use]
    pub const fn when_set(mask: u64) -> Self {
        Self::new(FlagCondition::Set(mask))
    }

    /// A rule firing when `mask` is clear.
    #[must_use]
    pub const fn when_clear(mask: u64) -> Self {
        Self::new(FlagCondition::Clear(mask))
    }

    /// A rule firing when every bit of `set` is set and none of `clear`.
    #[must_use]
    pub const fn when(set: u64, clear: u64) -> Self {
        Self::new(FlagCondition::Masked { set, clear })
    }

    const fn new(condition: FlagCondition) -> Self {
        Self {
            condition,
            footnote: None,
            required_part: None,
        }
    }

    /// Attach a footnote.
    #[must_use]
    pub fn footnote(mut self, id: impl Into<String>, definition: FootnoteDefinition) -> Self {
        self.footnote = Some((id.into(), definition));
        self
    }

    /// Require an extra part.
    #[must_use]
    pub fn requires(mut self, part: PartId) -> Self {
        self.required_part = Some(part);
        self
    }

    /// The rule's condition.
    #[must_use]
    pub const fn condition(&self) -> FlagCondition {
        self.condition
    }

    /// The required part, if any.
    #[must_use]
    pub const fn required_part(&self) -> Option<&PartId> {
        self.required_part.as_ref()
    }
}

/// A rule table references a part the catalog does not define.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleTableError {
    /// A rule requires an unknown part.
    #[error("rule table for {brand} requires unknown part {part}")]
    UnknownPart {
        /// Brand owning the table.
        brand: String,
        /// The undefined part.
        part: PartId,
    },
    /// A built-in rule names a malformed part id.
    #[error(transparent)]
    InvalidPart(#[from] InvalidPartIdError),
}

/// The output of evaluating a rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivation {
    /// Footnotes, base plus matched rules.
    pub footnotes: FootnoteCollection,
    /// Parts required by matched rules, in rule order.
    pub extra_parts: Vec<PartId>,
}

/// A brand's base footnotes and ordered flag rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    base: Vec<(String, FootnoteDefinition)>,
    rules: Vec<FlagRule>,
    experimental_longitudinal: Option<(String, FootnoteDefinition)>,
}

impl RuleTable {
    /// An empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: Vec::new(),
            rules: Vec::new(),
            experimental_longitudinal: None,
        }
    }

    /// Add an unconditional footnote.
    #[must_use]
    pub fn with_base(mut self, id: impl Into<String>, definition: FootnoteDefinition) -> Self {
        self.base.push((id.into(), definition));
        self
    }

    /// Append a rule. Rules are evaluated in the order they are added.
    #[must_use]
    pub fn with_rule(mut self, rule: FlagRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a footnote for platforms with experimental longitudinal control.
    #[must_use]
    pub fn with_experimental_longitudinal(
        mut self,
        id: impl Into<String>,
        definition: FootnoteDefinition,
    ) -> Self {
        self.experimental_longitudinal = Some((id.into(), definition));
        self
    }

    /// The rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[FlagRule] {
        &self.rules
    }

    /// Derive footnotes and required parts for a flag set.
    ///
    /// Base footnotes are applied first and are never replaced by a rule.
    /// Among rules, the last matching rule to write a footnote id wins.
    #[must_use]
    pub fn derive(&self, flags: CapabilityFlags) -> Derivation {
        let mut derivation = Derivation::default();
        derivation.footnotes.extend(self.base.iter().cloned());

        for rule in self.rules.iter().filter(|rule| rule.condition.matches(flags)) {
            if let Some((id, definition)) = &rule.footnote {
                if self.is_base(id) {
                    tracing::debug!("Rule footnote '{id}' shadows a base footnote; ignored");
                } else {
                    derivation.footnotes.insert(id.clone(), definition.clone());
                }
            }
            if let Some(part) = &rule.required_part {
                derivation.extra_parts.push(part.clone());
            }
        }

        derivation
    }

    /// Like [`derive`](Self::derive), plus the experimental longitudinal
    /// footnote when the platform has that control available.
    #[must_use]
    pub fn derive_for(
        &self,
        flags: CapabilityFlags,
        experimental_longitudinal: bool,
    ) -> Derivation {
        let mut derivation = self.derive(flags);
        let footnote = self
            .experimental_longitudinal
            .as_ref()
            .filter(|_| experimental_longitudinal);
        if let Some((id, definition)) = footnote {
            derivation.footnotes.insert(id.clone(), definition.clone());
        }
        derivation
    }

    /// Check every required part exists in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTableError::UnknownPart`] for the first rule requiring a
    /// part the catalog does not define.
    pub fn validate(&self, brand: &str, catalog: &PartCatalog) -> Result<(), RuleTableError> {
        for part in self.rules.iter().filter_map(FlagRule::required_part) {
            if !catalog.contains(part) {
                return Err(RuleTableError::UnknownPart {
                    brand: brand.to_string(),
                    part: part.clone(),
                });
            }
        }
        Ok(())
    }

    fn is_base(&self, id: &str) -> bool {
        self.base.iter().any(|(base, _)| base == id)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{
        footnote::Column,
        part::{PartCategory, PartDescriptor},
    };

    const ALT_BRAKE: u64 = 1;
    const CANFD: u64 = 1 << 1;
    const ANGLE: u64 = 1 << 2;

    fn note(text: &str) -> FootnoteDefinition {
        FootnoteDefinition::new(text, [Column::Model])
    }

    fn id(s: &str) -> PartId {
        PartId::try_from(s).unwrap()
    }

    fn table() -> RuleTable {
        RuleTable::new()
            .with_base("base", note("always"))
            .with_rule(FlagRule::when_set(ALT_BRAKE).footnote("alt_brake", note("alt brake")))
            .with_rule(
                FlagRule::when_set(CANFD)
                    .footnote("canfd", note("CAN FD"))
                    .requires(id("canfd_kit")),
            )
            .with_rule(FlagRule::when_set(ANGLE).footnote("lkas", note("angle")))
            .with_rule(FlagRule::when_clear(ANGLE).footnote("lkas", note("torque")))
    }

    #[test_case(0, false; "empty flags")]
    #[test_case(ALT_BRAKE, true; "exact bit")]
    #[test_case(ALT_BRAKE | CANFD, true; "superset")]
    #[test_case(CANFD, false; "other bit")]
    fn set_condition(bits: u64, expected: bool) {
        let flags = CapabilityFlags::from_bits(bits);
        assert_eq!(FlagCondition::Set(ALT_BRAKE).matches(flags), expected);
        assert_eq!(FlagCondition::Clear(ALT_BRAKE).matches(flags), !expected);
    }

    #[test]
    fn alt_brake_adds_only_its_footnote() {
        let table = RuleTable::new()
            .with_rule(FlagRule::when_set(ALT_BRAKE).footnote("alt_brake", note("alt brake")));

        let derivation = table.derive(CapabilityFlags::from_bits(ALT_BRAKE));

        assert_eq!(derivation.footnotes.ids().collect::<Vec<_>>(), vec!["alt_brake"]);
        assert!(derivation.extra_parts.is_empty());
    }

    #[test]
    fn base_footnotes_are_always_present() {
        let derivation = table().derive(CapabilityFlags::EMPTY);
        assert_eq!(derivation.footnotes.get("base").unwrap().text, "always");
    }

    #[test]
    fn base_footnotes_are_not_overridden() {
        let table = RuleTable::new()
            .with_base("base", note("always"))
            .with_rule(FlagRule::when_set(ALT_BRAKE).footnote("base", note("overridden")));

        let derivation = table.derive(CapabilityFlags::from_bits(ALT_BRAKE));

        assert_eq!(derivation.footnotes.get("base").unwrap().text, "always");
    }

    #[test]
    fn last_matching_rule_wins() {
        let table = RuleTable::new()
            .with_rule(FlagRule::when_set(ALT_BRAKE).footnote("dup", note("first")))
            .with_rule(FlagRule::when_set(ALT_BRAKE).footnote("dup", note("second")));

        let derivation = table.derive(CapabilityFlags::from_bits(ALT_BRAKE));

        assert_eq!(derivation.footnotes.get("dup").unwrap().text, "second");
    }

    #[test_case(ANGLE, "angle"; "bit set")]
    #[test_case(0, "torque"; "bit clear")]
    fn clear_rules_select_alternatives(bits: u64, expected: &str) {
        let derivation = table().derive(CapabilityFlags::from_bits(bits));
        assert_eq!(derivation.footnotes.get("lkas").unwrap().text, expected);
    }

    #[test]
    fn matching_rules_append_required_parts() {
        let derivation = table().derive(CapabilityFlags::from_bits(CANFD));
        assert_eq!(derivation.extra_parts, vec![id("canfd_kit")]);
        assert!(derivation.footnotes.contains("canfd"));
    }

    #[test_case(0, false; "empty flags")]
    #[test_case(ALT_BRAKE, true; "required bit only")]
    #[test_case(ALT_BRAKE | CANFD, true; "unrelated bit")]
    #[test_case(ALT_BRAKE | ANGLE, false; "forbidden bit present")]
    #[test_case(ANGLE, false; "required bit missing")]
    fn masked_condition(bits: u64, expected: bool) {
        let condition = FlagCondition::Masked {
            set: ALT_BRAKE,
            clear: ANGLE,
        };
        assert_eq!(condition.matches(CapabilityFlags::from_bits(bits)), expected);
    }

    #[test]
    fn derivation_does_not_depend_on_rule_order() {
        let rules = vec![
            FlagRule::when_set(ALT_BRAKE).footnote("alt_brake", note("alt brake")),
            FlagRule::when_set(CANFD)
                .footnote("canfd", note("CAN FD"))
                .requires(id("canfd_kit")),
            FlagRule::when_set(ANGLE).footnote("lkas", note("angle")),
            FlagRule::when_clear(ANGLE).footnote("lkas", note("torque")),
            FlagRule::when(ALT_BRAKE, CANFD).footnote("plain_brake", note("no CAN FD")),
        ];
        let build = |order: &[usize]| {
            order
                .iter()
                .fold(RuleTable::new().with_base("base", note("always")), |table, &i| {
                    table.with_rule(rules[i].clone())
                })
        };
        let orders: [&[usize]; 4] = [
            &[0, 1, 2, 3, 4],
            &[4, 3, 2, 1, 0],
            &[2, 0, 4, 3, 1],
            &[3, 1, 4, 0, 2],
        ];

        for bits in 0..8 {
            let flags = CapabilityFlags::from_bits(bits);
            let expected = build(orders[0]).derive(flags);
            for &order in &orders[1..] {
                assert_eq!(
                    build(order).derive(flags),
                    expected,
                    "flags {bits:#b}, order {order:?}"
                );
            }
        }
    }

    #[test_case(true, true; "available")]
    #[test_case(false, false; "unavailable")]
    fn experimental_longitudinal_footnote(available: bool, expected: bool) {
        let table = table().with_experimental_longitudinal("exp_long", note("alpha"));

        let derivation = table.derive_for(CapabilityFlags::EMPTY, available);

        assert_eq!(derivation.footnotes.contains("exp_long"), expected);
        assert!(derivation.footnotes.contains("base"));
    }

    #[test]
    fn validate_rejects_unknown_required_part() {
        let catalog = PartCatalog::new(vec![PartDescriptor::new(
            id("red_panda"),
            "red panda",
            PartCategory::Device,
        )])
        .unwrap();

        let err = table().validate("acme", &catalog).unwrap_err();
        assert_eq!(
            err,
            RuleTableError::UnknownPart {
                brand: "acme".to_string(),
                part: id("canfd_kit"),
            }
        );
    }

    #[test]
    fn validate_accepts_known_parts() {
        let catalog = PartCatalog::standard().unwrap();
        table().validate("acme", catalog).unwrap();
    }
}
