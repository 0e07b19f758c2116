//! Bill-of-materials resolution over the part composition graph.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{
    catalog::{CatalogError, PartCatalog},
    part::{PartDescriptor, PartId},
};

/// How occurrence counts are attached to resolved parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountStrategy {
    /// Count every occurrence in the flattened, pre-deduplication list: each
    /// explicit entry plus every path by which it reaches a descendant.
    #[default]
    Flat,
    /// Every distinct part is counted once.
    Distinct,
}

/// A part in a resolved bill of materials, with its occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPart<'c> {
    /// The catalog descriptor.
    pub part: &'c PartDescriptor,
    /// Number of occurrences (at least one).
    pub count: usize,
}

/// The deduplicated transitive closure of an explicit part list.
///
/// Both lists are in pre-order traversal order; use
/// [`BillOfMaterials::parts_by_name`] and [`BillOfMaterials::tools_by_name`]
/// for display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillOfMaterials<'c> {
    parts: Vec<ResolvedPart<'c>>,
    tools: Vec<ResolvedPart<'c>>,
}

impl<'c> BillOfMaterials<'c> {
    /// Installed hardware (every category except tools).
    #[must_use]
    pub fn parts(&self) -> &[ResolvedPart<'c>] {
        &self.parts
    }

    /// Tools needed for installation.
    #[must_use]
    pub fn tools(&self) -> &[ResolvedPart<'c>] {
        &self.tools
    }

    /// Whether nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.tools.is_empty()
    }

    /// Iterate over parts then tools.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPart<'c>> + '_ {
        self.parts.iter().chain(&self.tools)
    }

    /// Whether the given part appears anywhere in the result.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.iter().any(|entry| entry.part.id().as_str() == id)
    }

    /// Parts sorted by display name (case-sensitive, ascending, stable).
    #[must_use]
    pub fn parts_by_name(&self) -> Vec<ResolvedPart<'c>> {
        by_name(&self.parts)
    }

    /// Tools sorted by display name (case-sensitive, ascending, stable).
    #[must_use]
    pub fn tools_by_name(&self) -> Vec<ResolvedPart<'c>> {
        by_name(&self.tools)
    }
}

fn by_name<'c>(entries: &[ResolvedPart<'c>]) -> Vec<ResolvedPart<'c>> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.part.name().cmp(b.part.name()));
    sorted
}

/// Look up explicit part ids in the catalog.
///
/// Unknown ids are returned separately rather than failing, since an unknown
/// reference in documentation data only affects one record.
#[must_use]
pub fn lookup<'c, S: AsRef<str>>(
    catalog: &'c PartCatalog,
    ids: &[S],
) -> (Vec<&'c PartDescriptor>, Vec<String>) {
    let mut found = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();
    for id in ids {
        match catalog.get(id.as_ref()) {
            Some(part) => found.push(part),
            None => missing.push(id.as_ref().to_string()),
        }
    }
    (found, missing)
}

/// Resolve an explicit part list into a bill of materials.
///
/// The explicit list is walked in order. Each part not yet visited is
/// appended and its children are then walked recursively in declared order,
/// so the result is a deterministic pre-order traversal in which every part
/// identifier appears at most once. Tools are split out after traversal.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownPart`] if an explicit descriptor does not
/// belong to `catalog`.
pub fn resolve<'c>(
    catalog: &'c PartCatalog,
    explicit: &[&PartDescriptor],
    strategy: CountStrategy,
) -> Result<BillOfMaterials<'c>, CatalogError> {
    let roots = explicit
        .iter()
        .map(|part| {
            catalog
                .index_of(part.id())
                .ok_or_else(|| CatalogError::UnknownPart(part.id().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut order = Vec::new();
    let mut visited = BTreeSet::new();
    let mut counts = vec![0usize; catalog.len()];

    for &root in &roots {
        walk(catalog, root, &mut visited, &mut order);
        tally(catalog, root, &mut counts);
    }

    let mut bill = BillOfMaterials::default();
    for index in order {
        let count = match strategy {
            CountStrategy::Flat => counts[index],
            CountStrategy::Distinct => 1,
        };
        let entry = ResolvedPart {
            part: catalog.descriptor(index),
            count,
        };
        if entry.part.is_tool() {
            bill.tools.push(entry);
        } else {
            bill.parts.push(entry);
        }
    }

    Ok(bill)
}

/// Resolve a list of part ids, failing on any id missing from the catalog.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownPart`] for the first unknown id.
pub fn resolve_ids<'c>(
    catalog: &'c PartCatalog,
    ids: &[PartId],
    strategy: CountStrategy,
) -> Result<BillOfMaterials<'c>, CatalogError> {
    let (parts, missing) = lookup(catalog, ids);
    if let Some(id) = missing.into_iter().next() {
        return Err(CatalogError::UnknownPart(id));
    }
    resolve(catalog, &parts, strategy)
}

/// Pre-order, deduplicated walk. Depth is bounded by the catalog size since
/// the catalog is acyclic.
fn walk(
    catalog: &PartCatalog,
    index: usize,
    visited: &mut BTreeSet<usize>,
    order: &mut Vec<usize>,
) {
    if !visited.insert(index) {
        return;
    }
    order.push(index);
    for &child in catalog.child_indices(index) {
        walk(catalog, child, visited, order);
    }
}

/// Multiplicity-preserving walk: one count per path from the root.
fn tally(catalog: &PartCatalog, index: usize, counts: &mut [usize]) {
    counts[index] += 1;
    for &child in catalog.child_indices(index) {
        tally(catalog, child, counts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::part::PartCategory;

    fn id(s: &str) -> PartId {
        PartId::try_from(s).unwrap()
    }

    fn part(name: &str, category: PartCategory, children: &[&str]) -> PartDescriptor {
        PartDescriptor::new(id(name), name, category)
            .with_children(children.iter().map(|c| id(c)).collect())
    }

    /// ```text
    /// harness ─┬─ box
    ///          └─ cable
    /// kit ─┬─ panda ── cable
    ///      └─ cable
    /// device ── mount
    /// ```
    fn catalog() -> PartCatalog {
        PartCatalog::new(vec![
            part("harness", PartCategory::Harness, &["box", "cable"]),
            part("box", PartCategory::Accessory, &[]),
            part("cable", PartCategory::Accessory, &[]),
            part("kit", PartCategory::Kit, &["panda", "cable"]),
            part("panda", PartCategory::Device, &["cable"]),
            part("device", PartCategory::Device, &["mount"]),
            part("mount", PartCategory::Mount, &[]),
            part("pry", PartCategory::Tool, &[]),
        ])
        .unwrap()
    }

    fn ids(entries: &[ResolvedPart<'_>]) -> Vec<(String, usize)> {
        entries
            .iter()
            .map(|e| (e.part.id().to_string(), e.count))
            .collect()
    }

    fn explicit<'c>(catalog: &'c PartCatalog, names: &[&str]) -> Vec<&'c PartDescriptor> {
        names.iter().map(|n| catalog.get(n).unwrap()).collect()
    }

    #[test]
    fn empty_list_resolves_to_nothing() {
        let catalog = catalog();
        let bill = resolve(&catalog, &[], CountStrategy::Flat).unwrap();
        assert!(bill.is_empty());
    }

    #[test]
    fn device_pulls_in_its_mount() {
        let catalog = catalog();
        let bill =
            resolve(&catalog, &explicit(&catalog, &["device"]), CountStrategy::Flat).unwrap();

        assert_eq!(
            ids(bill.parts()),
            vec![("device".to_string(), 1), ("mount".to_string(), 1)]
        );
        assert!(bill.tools().is_empty());
    }

    #[test]
    fn leaf_part_is_its_own_subtree() {
        let catalog = catalog();
        let bill = resolve(&catalog, &explicit(&catalog, &["box"]), CountStrategy::Flat).unwrap();
        assert_eq!(ids(bill.parts()), vec![("box".to_string(), 1)]);
    }

    #[test]
    fn shared_descendants_are_deduplicated_in_pre_order() {
        let catalog = catalog();
        let bill = resolve(
            &catalog,
            &explicit(&catalog, &["harness", "kit"]),
            CountStrategy::Flat,
        )
        .unwrap();

        let order: Vec<_> = bill.parts().iter().map(|e| e.part.id().as_str()).collect();
        assert_eq!(order, vec!["harness", "box", "cable", "kit", "panda"]);
    }

    #[test]
    fn flat_strategy_counts_every_path() {
        let catalog = catalog();
        let bill = resolve(
            &catalog,
            &explicit(&catalog, &["harness", "kit", "harness"]),
            CountStrategy::Flat,
        )
        .unwrap();

        // cable: harness ×2, kit directly, kit via panda
        assert_eq!(
            ids(bill.parts()),
            vec![
                ("harness".to_string(), 2),
                ("box".to_string(), 2),
                ("cable".to_string(), 4),
                ("kit".to_string(), 1),
                ("panda".to_string(), 1),
            ]
        );
    }

    #[test]
    fn distinct_strategy_counts_once() {
        let catalog = catalog();
        let bill = resolve(
            &catalog,
            &explicit(&catalog, &["harness", "kit", "harness"]),
            CountStrategy::Distinct,
        )
        .unwrap();

        assert!(bill.parts().iter().all(|e| e.count == 1));
        assert_eq!(bill.parts().len(), 5);
    }

    #[test]
    fn tools_are_partitioned() {
        let catalog = catalog();
        let bill = resolve(
            &catalog,
            &explicit(&catalog, &["pry", "device"]),
            CountStrategy::Flat,
        )
        .unwrap();

        assert_eq!(ids(bill.tools()), vec![("pry".to_string(), 1)]);
        assert_eq!(bill.parts().len(), 2);
    }

    #[test]
    fn resolution_is_idempotent() {
        let catalog = catalog();
        let list = explicit(&catalog, &["kit", "device", "harness", "pry"]);

        let first = resolve(&catalog, &list, CountStrategy::Flat).unwrap();
        let second = resolve(&catalog, &list, CountStrategy::Flat).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn closure_is_complete_and_unique_for_every_part() {
        let catalog = PartCatalog::standard().unwrap();

        for root in catalog.iter() {
            let bill = resolve(catalog, &[root], CountStrategy::Flat).unwrap();

            let mut expected = vec![root.id().clone()];
            let mut stack: Vec<_> = root.children().to_vec();
            while let Some(next) = stack.pop() {
                stack.extend(catalog.get(&next).unwrap().children().iter().cloned());
                expected.push(next);
            }
            for id in &expected {
                assert!(bill.contains(id), "{id} missing from closure of {}", root.id());
            }

            let mut seen = BTreeSet::new();
            assert!(bill.iter().all(|e| seen.insert(e.part.id().clone())));
        }
    }

    #[test]
    fn display_order_is_by_name() {
        let catalog = PartCatalog::new(vec![
            part("zeta", PartCategory::Accessory, &["alpha", "upper"]),
            part("alpha", PartCategory::Accessory, &[]),
            part("upper", PartCategory::Accessory, &[]),
        ])
        .unwrap();
        // Names are the ids, except "upper" which sorts before lowercase.
        let bill = resolve(&catalog, &explicit(&catalog, &["zeta"]), CountStrategy::Flat).unwrap();

        let names: Vec<_> = bill
            .parts_by_name()
            .iter()
            .map(|e| e.part.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "upper", "zeta"]);
    }

    #[test]
    fn foreign_descriptor_is_a_configuration_error() {
        let catalog = catalog();
        let stranger = part("stranger", PartCategory::Accessory, &[]);

        let err = resolve(&catalog, &[&stranger], CountStrategy::Flat).unwrap_err();
        assert_eq!(err, CatalogError::UnknownPart("stranger".to_string()));
    }

    #[test]
    fn resolve_ids_reports_unknown_ids() {
        let catalog = catalog();
        let err = resolve_ids(&catalog, &[id("device"), id("ghost")], CountStrategy::Flat)
            .unwrap_err();
        assert_eq!(err, CatalogError::UnknownPart("ghost".to_string()));
    }
}
