//! Wiring validation without construction.
//!
//! Checks every eagerly resolved dependency against the same selection rules
//! the container uses at lookup time, and looks for construction cycles.
//! Provider dependencies are resolved lazily, so they are checked for a
//! selectable target but never count as cycle edges.

use crate::container::select;
use crate::definition::{ComponentDefinition, DependencyKind};
use crate::error::{DiError, DiResult};
use crate::registry::Catalog;

/// One wiring problem found by [`Registry::validate`](crate::Registry::validate).
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Component whose dependency (or cycle) is broken
    pub component: String,
    /// The error a lookup would fail with
    pub error: DiError,
}

/// Result of validating a registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wirebox::{ComponentDefinition, DiError, Registry};
///
/// struct Missing;
/// struct Service;
///
/// let mut registry = Registry::new();
/// registry.register(
///     ComponentDefinition::singleton::<Service, _>(|_| Ok(Arc::new(Service))).depends_on::<Missing>(),
/// )?;
///
/// let report = registry.validate();
/// assert!(!report.is_ok());
/// assert!(matches!(report.issues()[0].error, DiError::NoSuchComponent { .. }));
/// # Ok::<(), DiError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// The first issue as an error, if any.
    pub fn into_result(self) -> DiResult<()> {
        match self.issues.into_iter().next() {
            Some(issue) => Err(issue.error),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

pub(crate) fn validate(catalog: &Catalog) -> ValidationReport {
    let mut report = ValidationReport::default();
    let edges = eager_edges(catalog, |definition, error| {
        report.issues.push(ValidationIssue {
            component: definition.name().to_string(),
            error,
        })
    });

    let mut marks = vec![Mark::Unvisited; catalog.len()];
    let mut stack = Vec::new();
    for start in 0..catalog.len() {
        if marks[start] == Mark::Unvisited {
            visit(start, &edges, &mut marks, &mut stack, catalog, &mut report);
        }
    }

    report
}

/// For every definition that lies on a construction cycle, the cycle path
/// starting and ending with that definition.
///
/// Computed once per container so a cyclic lookup fails before any
/// construction lock is taken, whichever thread gets there first.
pub(crate) fn cycle_paths(catalog: &Catalog) -> Vec<Option<Vec<String>>> {
    let edges = eager_edges(catalog, |_, _| {});

    (0..catalog.len())
        .map(|start| {
            let mut visited = vec![false; catalog.len()];
            let mut path = vec![start];
            path_back(start, start, &edges, &mut visited, &mut path).then(|| {
                path.iter()
                    .map(|&n| catalog.get(n).name().to_string())
                    .collect()
            })
        })
        .collect()
}

// Resolvable `Instance` edges per definition. Provider edges are deferred and
// never part of a construction cycle.
fn eager_edges<F>(catalog: &Catalog, mut on_error: F) -> Vec<Vec<usize>>
where
    F: FnMut(&ComponentDefinition, DiError),
{
    let mut edges = Vec::with_capacity(catalog.len());
    for (_, definition) in catalog.iter() {
        let mut targets = Vec::new();
        for dependency in definition.dependencies() {
            match select(catalog, dependency.key(), dependency.qualifier()) {
                Ok(target) if dependency.kind() == DependencyKind::Instance => targets.push(target),
                Ok(_) => {}
                Err(error) => on_error(definition, error),
            }
        }
        edges.push(targets);
    }
    edges
}

// Depth-first search in declaration order for a path from `node` back to `start`.
fn path_back(start: usize, node: usize, edges: &[Vec<usize>], visited: &mut [bool], path: &mut Vec<usize>) -> bool {
    for &next in &edges[node] {
        if next == start {
            path.push(next);
            return true;
        }
        if !visited[next] {
            visited[next] = true;
            path.push(next);
            if path_back(start, next, edges, visited, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

fn visit(
    node: usize,
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
    catalog: &Catalog,
    report: &mut ValidationReport,
) {
    marks[node] = Mark::OnStack;
    stack.push(node);

    for &next in &edges[node] {
        match marks[next] {
            Mark::Unvisited => visit(next, edges, marks, stack, catalog, report),
            Mark::OnStack => {
                let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                let mut path: Vec<String> = stack[start..]
                    .iter()
                    .map(|&n| catalog.get(n).name().to_string())
                    .collect();
                path.push(catalog.get(next).name().to_string());
                report.issues.push(ValidationIssue {
                    component: catalog.get(next).name().to_string(),
                    error: DiError::CyclicDependency(path),
                });
            }
            Mark::Done => {}
        }
    }

    stack.pop();
    marks[node] = Mark::Done;
}
