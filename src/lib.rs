//! `transect_georef` turns tree positions measured along sampling strips into projected
//! (UTM) coordinates.
//!
//! Field crews record each tree as an offset pair inside a strip (transect): `Y` is the
//! distance along the strip from its start, `X` the lateral position, with the strip
//! centre line at a fixed `X` (the _half-width_, 25 by default). Given the strip's two
//! endpoints in a projected CRS, a [`TransectMapper`] places the tree in that CRS:
//!
//! 1. `û = (P1 - P0) / |P1 - P0|`, and `n̂` is `û` rotated 90° counter-clockwise
//! 2. `base = P0 + û * Y`
//! 3. `result = base + n̂ * (X - half_width)`
//!
//! Anything that implements [`Coord`] can be mapped: `(T, T)` tuples of any float type,
//! and, with the default `geo-types` feature, `geo_types::Coord` and `geo_types::Point`.
//! The [`Georeference`] trait lifts the mapper to whole `geo-types` geometries.
//!
//! # Usage
//!
//! The pieces of a full run, as driven by the `transect-georef` binary:
//!
//! 1. Read the strip table into a [`StripIndex`] with [`table::read_strips`] and the tree
//!    table with [`table::read_trees`]. Both accept `;`-separated, comma-decimal,
//!    Latin-1 exports by default (see [`TableOptions`]);
//! 2. Build a mapper with [`MapperBuilder`], or from a [`Config`];
//! 3. Call [`georeference_all`] with a [`FailurePolicy`]: a tree on an unknown or
//!    zero-length strip either is skipped and reported, or aborts the run;
//! 4. Write the results with [`export::write_csv`] and [`export::write_geojson`].
//!
//! **Note**: offsets past either end of a strip are extrapolated by default. Use
//! [`OffsetPolicy::Warn`] or [`OffsetPolicy::Reject`] to be told about them instead.
//!
//! # Example
//!
//! ```
//! use transect_georef::{FailurePolicy, TableOptions, TransectMapper, georeference_all, table};
//!
//! let options = TableOptions::default();
//! let strips = "ID_faixa;X0;Y0;X1;Y1\n1;500000;1000000;500000;1000050\n";
//! let strips = table::parse_strips(strips, &options).unwrap();
//! let trees = "ID;X;Y;ID_faixa\nT1;25;25;01\nT2;30,5;10;1\n";
//! let trees = table::parse_trees(trees, &options).unwrap();
//!
//! let outcome = georeference_all(
//!     &trees.trees,
//!     &strips,
//!     &TransectMapper::default(),
//!     FailurePolicy::Skip,
//! )
//! .unwrap();
//!
//! assert_eq!(outcome.georeferenced[0].x_utm, 500000.0);
//! assert_eq!(outcome.georeferenced[0].y_utm, 1000025.0);
//! // 5.5 to the left of a north-pointing strip is 5.5 to the west
//! assert_eq!(outcome.georeferenced[1].x_utm, 499994.5);
//! ```

pub mod config;
pub mod crs;
pub mod export;
mod georef;
#[cfg(feature = "geo-types")]
mod geo_types;
mod index;
pub mod table;
mod transect;
mod transform;

pub use crate::config::Config;
pub use crate::config::ConfigError;
pub use crate::crs::Crs;
pub use crate::export::ExportError;
pub use crate::georef::{
    Failure, FailurePolicy, GeoreferenceError, GeoreferencedTree, Outcome, RecordError,
    georeference_all, georeference_tree,
};
pub use crate::index::{LookupError, StripIndex};
pub use crate::table::{ParseError, TableError, TableOptions, Tree, TreeTable};
pub use crate::transect::{
    Coord, CoordinateType, DEFAULT_HALF_WIDTH, MapError, MapperBuilder, OffsetPolicy, Strip,
    TransectMapper,
};
pub use crate::transform::Georeference;
