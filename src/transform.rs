use crate::transect::{CoordinateType, MapError, Strip, TransectMapper};

/// Georeference a geometry whose coordinates are offsets on a single strip.
pub trait Georeference<T: CoordinateType> {
    type Output;

    /// Replace the geometry's offsets with absolute coordinates.
    ///
    #[cfg_attr(feature = "geo-types", doc = r##"
# Examples

```
use transect_georef::{Georeference, Strip, TransectMapper};
# use approx::assert_relative_eq;

let strip = Strip::new("1", (500_000.0, 1_000_000.0), (500_000.0, 1_000_050.0));
let mut point = geo_types::point!(x: 25.0, y: 25.0);
point.georeference(&TransectMapper::default(), &strip).unwrap();

assert_relative_eq!(point, geo_types::point!(x: 500_000.0, y: 1_000_025.0));
```
"##)]
    fn georeference(&mut self, mapper: &TransectMapper, strip: &Strip) -> Result<(), MapError>;

    /// Immutable flavor of [`Georeference::georeference`], which allocates a new geometry.
    ///
    #[cfg_attr(feature = "geo-types", doc = r##"
# Examples

```
use geo_types::line_string;
use transect_georef::{Georeference, Strip, TransectMapper};
# use approx::assert_relative_eq;

let strip = Strip::new("1", (0.0, 0.0), (0.0, 10.0));
let offsets = line_string![(x: 25.0, y: 0.0), (x: 25.0, y: 10.0)];
let line = offsets.georeferenced(&TransectMapper::default(), &strip).unwrap();

assert_relative_eq!(line, line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 10.0)]);
// original `offsets` is untouched
assert_relative_eq!(offsets.0[1].y, 10.0);
```
"##)]
    fn georeferenced(
        &self,
        mapper: &TransectMapper,
        strip: &Strip,
    ) -> Result<Self::Output, MapError>;
}
