use crate::index::{LookupError, StripIndex};
use crate::table::Tree;
use crate::transect::{MapError, TransectMapper};
use log::{debug, warn};
use thiserror::Error;

/// Why a single tree could not be georeferenced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Map(#[from] MapError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoreferenceError {
    #[error("tree {tree_id:?}: {source}")]
    Aborted {
        tree_id: String,
        #[source]
        source: RecordError,
    },
}

/// How [`georeference_all`] reacts to a tree that fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and carry on with the next tree.
    #[default]
    Skip,
    /// Stop at the first failure.
    Abort,
}

/// A tree with its absolute coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoreferencedTree<'a> {
    pub tree: &'a Tree,
    pub x_utm: f64,
    pub y_utm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure<'a> {
    pub tree: &'a Tree,
    pub error: RecordError,
}

/// Result of a batch run, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome<'a> {
    pub georeferenced: Vec<GeoreferencedTree<'a>>,
    pub failures: Vec<Failure<'a>>,
}

pub fn georeference_tree<'a>(
    tree: &'a Tree,
    strips: &StripIndex,
    mapper: &TransectMapper,
) -> Result<GeoreferencedTree<'a>, RecordError> {
    let strip = strips.get(&tree.strip_id)?;
    let (x_utm, y_utm) = mapper.map_xy(strip, tree.x, tree.y)?;
    debug!(
        "tree {:?} on strip {:?}: ({}, {}) -> ({}, {})",
        tree.id, strip.id, tree.x, tree.y, x_utm, y_utm
    );
    Ok(GeoreferencedTree { tree, x_utm, y_utm })
}

/// Georeference every tree against `strips`.
///
/// Trees are independent of one another, so under [`FailurePolicy::Skip`] a bad
/// strip only costs the trees that sit on it.
pub fn georeference_all<'a>(
    trees: &'a [Tree],
    strips: &StripIndex,
    mapper: &TransectMapper,
    policy: FailurePolicy,
) -> Result<Outcome<'a>, GeoreferenceError> {
    let mut outcome = Outcome::default();
    for tree in trees {
        match georeference_tree(tree, strips, mapper) {
            Ok(georeferenced) => outcome.georeferenced.push(georeferenced),
            Err(error) => match policy {
                FailurePolicy::Abort => {
                    return Err(GeoreferenceError::Aborted {
                        tree_id: tree.id.clone(),
                        source: error,
                    });
                }
                FailurePolicy::Skip => {
                    warn!("skipping tree {:?}: {}", tree.id, error);
                    outcome.failures.push(Failure { tree, error });
                }
            },
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transect::Strip;
    use csv::StringRecord;

    fn tree(id: &str, x: f64, y: f64, strip_id: &str) -> Tree {
        Tree {
            id: id.to_string(),
            x,
            y,
            strip_id: strip_id.to_string(),
            fields: StringRecord::from(vec![id, "", "", strip_id]),
        }
    }

    fn strips() -> StripIndex {
        vec![
            Strip::new("1", (500_000.0, 1_000_000.0), (500_000.0, 1_000_050.0)),
            Strip::new("flat", (3.0, 3.0), (3.0, 3.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_end_to_end_example() {
        let trees = [tree("T1", 25.0, 25.0, "1")];
        let outcome =
            georeference_all(&trees, &strips(), &TransectMapper::default(), FailurePolicy::Abort)
                .unwrap();
        assert!(outcome.failures.is_empty());
        let result = &outcome.georeferenced[0];
        assert_eq!(result.tree.id, "T1");
        assert_eq!(result.x_utm, 500_000.0);
        assert_eq!(result.y_utm, 1_000_025.0);
    }

    #[test]
    fn test_unknown_strip() {
        let orphan = tree("T9", 25.0, 1.0, "42");
        let err = georeference_tree(&orphan, &strips(), &TransectMapper::default()).unwrap_err();
        assert_eq!(
            err,
            RecordError::Lookup(LookupError {
                strip_id: "42".to_string()
            })
        );
    }

    #[test]
    fn test_skip_keeps_going_past_bad_records() {
        let trees = [
            tree("a", 25.0, 0.0, "flat"),
            tree("b", 20.0, 10.0, "1"),
            tree("c", 25.0, 0.0, "missing"),
            tree("d", 25.0, 50.0, "1"),
        ];
        let outcome =
            georeference_all(&trees, &strips(), &TransectMapper::default(), FailurePolicy::Skip)
                .unwrap();
        let ok: Vec<_> = outcome.georeferenced.iter().map(|g| g.tree.id.as_str()).collect();
        assert_eq!(ok, ["b", "d"]);
        assert_eq!(outcome.georeferenced[0].x_utm, 500_005.0);
        let failed: Vec<_> = outcome.failures.iter().map(|f| f.tree.id.as_str()).collect();
        assert_eq!(failed, ["a", "c"]);
        assert!(matches!(
            outcome.failures[0].error,
            RecordError::Map(MapError::DegenerateStrip { .. })
        ));
        assert!(matches!(outcome.failures[1].error, RecordError::Lookup(_)));
    }

    #[test]
    fn test_abort_stops_at_first_failure() {
        let trees = [tree("a", 25.0, 0.0, "1"), tree("b", 25.0, 0.0, "flat")];
        let err =
            georeference_all(&trees, &strips(), &TransectMapper::default(), FailurePolicy::Abort)
                .unwrap_err();
        let GeoreferenceError::Aborted { tree_id, source } = err;
        assert_eq!(tree_id, "b");
        assert!(matches!(source, RecordError::Map(MapError::DegenerateStrip { .. })));
    }
}
