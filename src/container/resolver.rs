//! Candidate selection for a requested capability.

use crate::error::{DiError, DiResult};
use crate::key::{Key, Qualifier};
use crate::registry::Catalog;

/// Picks exactly one definition index for `key`.
///
/// With a qualifier, the single definition carrying it wins. Without one, a
/// lone candidate wins; among several, the single `primary` one, else the
/// single unqualified one.
pub(crate) fn select(catalog: &Catalog, key: &Key, qualifier: Option<&Qualifier>) -> DiResult<usize> {
    let candidates = catalog.candidates(key);

    match qualifier {
        Some(wanted) => {
            let mut matching = candidates
                .iter()
                .copied()
                .filter(|&i| catalog.get(i).qualifier() == Some(wanted));
            match (matching.next(), matching.next()) {
                (Some(index), None) => Ok(index),
                // Registration forbids duplicate qualifiers, kept for completeness.
                (Some(_), Some(_)) => Err(ambiguous(catalog, key, qualifier, candidates)),
                (None, _) if candidates.len() > 1 => Err(ambiguous(catalog, key, qualifier, candidates)),
                (None, _) => Err(DiError::NoSuchComponent {
                    capability: key.display_name(),
                    qualifier: Some(wanted.clone()),
                }),
            }
        }
        None => match candidates {
            [] => Err(DiError::NoSuchComponent {
                capability: key.display_name(),
                qualifier: None,
            }),
            [only] => Ok(*only),
            several => {
                let primaries = single(several.iter().copied().filter(|&i| catalog.get(i).is_primary()));
                let defaults = || single(several.iter().copied().filter(|&i| catalog.get(i).qualifier().is_none()));
                match primaries {
                    Found::One(index) => Ok(index),
                    Found::Many => Err(ambiguous(catalog, key, None, several)),
                    Found::None => match defaults() {
                        Found::One(index) => Ok(index),
                        _ => Err(ambiguous(catalog, key, None, several)),
                    },
                }
            }
        },
    }
}

enum Found {
    None,
    One(usize),
    Many,
}

fn single(mut indices: impl Iterator<Item = usize>) -> Found {
    match (indices.next(), indices.next()) {
        (None, _) => Found::None,
        (Some(index), None) => Found::One(index),
        (Some(_), Some(_)) => Found::Many,
    }
}

fn ambiguous(catalog: &Catalog, key: &Key, qualifier: Option<&Qualifier>, candidates: &[usize]) -> DiError {
    DiError::AmbiguousDependency {
        capability: key.display_name(),
        qualifier: qualifier.cloned(),
        candidates: candidates
            .iter()
            .map(|&i| {
                let definition = catalog.get(i);
                match definition.qualifier() {
                    Some(q) => format!("{} ({})", definition.name(), q),
                    None => definition.name().to_string(),
                }
            })
            .collect(),
    }
}
