//! The part catalog: an arena of immutable [`PartDescriptor`]s plus the
//! composition graph between them.
//!
//! The catalog knows nothing about vehicles. It is validated once on
//! construction (unique ids, known children, no cycles) and is read-only
//! afterwards, so it can be shared freely between worker threads.

use std::{collections::BTreeMap, sync::OnceLock};

use petgraph::{
    algo::{is_cyclic_directed, tarjan_scc},
    graphmap::DiGraphMap,
};
use thiserror::Error;

use crate::domain::part::{InvalidPartIdError, PartDescriptor, PartId};

mod standard;

/// Errors that indicate the catalog itself is broken.
///
/// These are configuration defects, not per-vehicle conditions, and abort a
/// compilation run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two descriptors share the same identifier.
    #[error("part {0} is defined more than once")]
    DuplicatePart(PartId),
    /// A descriptor lists a child that is not in the catalog.
    #[error("part {parent} lists unknown child part {child}")]
    UnknownChild {
        /// The part declaring the child.
        parent: PartId,
        /// The missing child identifier.
        child: String,
    },
    /// The composition graph contains a cycle.
    #[error("part composition cycle: {}", display_cycle(.0))]
    Cycle(Vec<PartId>),
    /// A part was referenced that does not belong to this catalog.
    #[error("part {0} is not in the catalog")]
    UnknownPart(String),
    /// A built-in identifier failed validation.
    #[error(transparent)]
    InvalidId(#[from] InvalidPartIdError),
}

fn display_cycle(parts: &[PartId]) -> String {
    parts
        .iter()
        .map(PartId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// An immutable, acyclic table of parts keyed by identifier.
#[derive(Debug)]
pub struct PartCatalog {
    /// Descriptors, in insertion order. The position is the part's index.
    parts: Vec<PartDescriptor>,

    /// Lookup from identifier to index.
    index: BTreeMap<PartId, usize>,

    /// Child indices for each part, in declared order.
    children: Vec<Vec<usize>>,
}

static STANDARD: OnceLock<Result<PartCatalog, CatalogError>> = OnceLock::new();

impl PartCatalog {
    /// Build a catalog from a list of descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicatePart`] if two descriptors share an id,
    /// [`CatalogError::UnknownChild`] if a child id is not defined, or
    /// [`CatalogError::Cycle`] if any descriptor (transitively) contains
    /// itself.
    pub fn new(parts: Vec<PartDescriptor>) -> Result<Self, CatalogError> {
        let mut index = BTreeMap::new();
        for (position, part) in parts.iter().enumerate() {
            if index.insert(part.id().clone(), position).is_some() {
                return Err(CatalogError::DuplicatePart(part.id().clone()));
            }
        }

        let children = parts
            .iter()
            .map(|part| {
                part.children()
                    .iter()
                    .map(|child| {
                        index
                            .get(child)
                            .copied()
                            .ok_or_else(|| CatalogError::UnknownChild {
                                parent: part.id().clone(),
                                child: child.to_string(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = Self {
            parts,
            index,
            children,
        };

        if let Some(cycle) = catalog.cycles().into_iter().next() {
            return Err(CatalogError::Cycle(cycle));
        }

        tracing::debug!("Built part catalog with {} parts", catalog.len());

        Ok(catalog)
    }

    /// The built-in catalog.
    ///
    /// It is constructed on first use, exactly once, even when first probed
    /// from several threads at the same time.
    ///
    /// # Errors
    ///
    /// Returns the construction error if the built-in table is malformed.
    pub fn standard() -> Result<&'static Self, CatalogError> {
        STANDARD
            .get_or_init(|| standard::parts().and_then(Self::new))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Number of parts in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the catalog has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Look up a part by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PartDescriptor> {
        self.index_of(id).map(|i| &self.parts[i])
    }

    /// Whether the catalog defines the given identifier.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Iterate over all parts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PartDescriptor> + '_ {
        self.parts.iter()
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn descriptor(&self, index: usize) -> &PartDescriptor {
        &self.parts[index]
    }

    pub(crate) fn child_indices(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    fn graph(&self) -> DiGraphMap<usize, ()> {
        let mut graph = DiGraphMap::with_capacity(self.parts.len(), self.parts.len());
        for (parent, children) in self.children.iter().enumerate() {
            graph.add_node(parent);
            for &child in children {
                graph.add_edge(parent, child, ());
            }
        }
        graph
    }

    /// Return all cycles in the composition graph as sorted sets of ids.
    ///
    /// Always empty for a constructed catalog; used during construction.
    fn cycles(&self) -> Vec<Vec<PartId>> {
        let graph = self.graph();
        if !is_cyclic_directed(&graph) {
            return Vec::new();
        }

        let mut cycles = Vec::new();
        for component in tarjan_scc(&graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| graph.contains_edge(node, node));
            if is_cycle {
                let mut ids: Vec<_> = component
                    .iter()
                    .map(|&i| self.parts[i].id().clone())
                    .collect();
                ids.sort();
                cycles.push(ids);
            }
        }

        cycles.sort();
        cycles
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::domain::part::PartCategory;

    fn id(s: &str) -> PartId {
        PartId::try_from(s).unwrap()
    }

    fn part(name: &str, children: &[&str]) -> PartDescriptor {
        PartDescriptor::new(id(name), name, PartCategory::Accessory)
            .with_children(children.iter().map(|c| id(c)).collect())
    }

    #[test]
    fn builds_acyclic_catalog() {
        let catalog =
            PartCatalog::new(vec![part("a", &["b", "c"]), part("b", &["c"]), part("c", &[])])
                .unwrap();

        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("b"));
        assert_eq!(catalog.get("a").unwrap().children().len(), 2);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = PartCatalog::new(vec![part("a", &[]), part("a", &[])]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicatePart(id("a")));
    }

    #[test]
    fn rejects_unknown_child() {
        let err = PartCatalog::new(vec![part("a", &["ghost"])]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownChild {
                parent: id("a"),
                child: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn rejects_transitive_cycle() {
        let err = PartCatalog::new(vec![
            part("a", &["b"]),
            part("b", &["c"]),
            part("c", &["a"]),
            part("d", &[]),
        ])
        .unwrap_err();

        assert_eq!(err, CatalogError::Cycle(vec![id("a"), id("b"), id("c")]));
        assert_eq!(err.to_string(), "part composition cycle: a -> b -> c");
    }

    #[test]
    fn rejects_self_containing_part() {
        let err = PartCatalog::new(vec![part("loop", &["loop"])]).unwrap_err();
        assert_eq!(err, CatalogError::Cycle(vec![id("loop")]));
    }

    #[test]
    fn standard_catalog_is_valid() {
        let catalog = PartCatalog::standard().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.contains("comma_3x"));
        assert!(catalog.contains("angled_mount_8_degrees"));
    }

    #[test]
    fn standard_catalog_is_built_once_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                thread::spawn(|| PartCatalog::standard().unwrap() as *const PartCatalog as usize)
            })
            .collect();

        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }
}
