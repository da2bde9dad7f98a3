//! Uniform accessibility filter with containment cascade

use std::collections::{HashMap, HashSet};

use super::Extraction;
use crate::graph::model::{Accessibility, RelType};

/// Drop symbols below `minimum`, everything they transitively contain, and
/// every relationship touching a dropped key.
#[must_use]
pub fn apply_accessibility(extraction: Extraction, minimum: Accessibility) -> Extraction {
    let mut dropped: Vec<&str> = extraction
        .symbols
        .iter()
        .filter(|s| !s.accessibility.admits(minimum))
        .map(|s| s.key.as_str())
        .collect();

    if dropped.is_empty() {
        return extraction;
    }

    let mut contains: HashMap<&str, Vec<&str>> = HashMap::new();
    for rel in &extraction.relationships {
        if rel.rel_type == RelType::Contains {
            contains
                .entry(rel.from_key.as_str())
                .or_default()
                .push(rel.to_key.as_str());
        }
    }

    let mut removed: HashSet<String> = HashSet::new();
    while let Some(key) = dropped.pop() {
        if removed.insert(key.to_string()) {
            if let Some(children) = contains.get(key) {
                dropped.extend(children.iter().copied());
            }
        }
    }

    let Extraction {
        symbols,
        relationships,
    } = extraction;

    Extraction {
        symbols: symbols
            .into_iter()
            .filter(|s| !removed.contains(&s.key))
            .collect(),
        relationships: relationships
            .into_iter()
            .filter(|r| !removed.contains(&r.from_key) && !removed.contains(&r.to_key))
            .collect(),
    }
}
