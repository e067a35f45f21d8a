use crate::transect::{CoordinateType, MapError, Strip, TransectMapper};
use crate::transform::Georeference;

///```rust
/// # use approx::assert_relative_eq;
/// use transect_georef::{Strip, TransectMapper};
/// use geo_types::Coord;
///
/// let strip = Strip::new("1", (500_000.0, 1_000_000.0), (500_050.0, 1_000_000.0));
/// let mapper = TransectMapper::default();
/// let result = mapper.map(&strip, Coord { x: 30.0f64, y: 10.0 }).unwrap();
/// assert_relative_eq!(result.x, 500_010.0);
/// assert_relative_eq!(result.y, 1_000_005.0);
/// ```
impl<T: CoordinateType> crate::Coord<T> for geo_types::Coord<T> {
    fn x(&self) -> T {
        self.x
    }
    fn y(&self) -> T {
        self.y
    }
    fn from_xy(x: T, y: T) -> Self {
        Self { x, y }
    }
}

///```rust
/// # use approx::assert_relative_eq;
/// use transect_georef::{Strip, TransectMapper};
/// use geo_types::Point;
///
/// let strip = Strip::new("1", (500_000.0, 1_000_000.0), (500_000.0, 1_000_050.0));
/// let mapper = TransectMapper::default();
/// let result = mapper.map(&strip, Point::new(25.0f64, 25.0)).unwrap();
/// assert_relative_eq!(result.x(), 500_000.0);
/// assert_relative_eq!(result.y(), 1_000_025.0);
/// ```
impl<T: CoordinateType> crate::Coord<T> for geo_types::Point<T> {
    fn x(&self) -> T {
        geo_types::Point::x(*self)
    }
    fn y(&self) -> T {
        geo_types::Point::y(*self)
    }
    fn from_xy(x: T, y: T) -> Self {
        Self::new(x, y)
    }
}

impl<T> Georeference<T> for geo_types::Coord<T>
where
    T: CoordinateType,
{
    type Output = Self;

    fn georeference(&mut self, mapper: &TransectMapper, strip: &Strip) -> Result<(), MapError> {
        *self = mapper.map(strip, *self)?;
        Ok(())
    }

    fn georeferenced(&self, mapper: &TransectMapper, strip: &Strip) -> Result<Self, MapError> {
        mapper.map(strip, *self)
    }
}

impl<T> Georeference<T> for geo_types::Point<T>
where
    T: CoordinateType,
{
    type Output = Self;

    fn georeference(&mut self, mapper: &TransectMapper, strip: &Strip) -> Result<(), MapError> {
        self.0.georeference(mapper, strip)
    }

    fn georeferenced(&self, mapper: &TransectMapper, strip: &Strip) -> Result<Self, MapError> {
        Ok(geo_types::Point(self.0.georeferenced(mapper, strip)?))
    }
}

impl<T> Georeference<T> for geo_types::MultiPoint<T>
where
    T: CoordinateType,
{
    type Output = Self;

    fn georeference(&mut self, mapper: &TransectMapper, strip: &Strip) -> Result<(), MapError> {
        for point in &mut self.0 {
            point.georeference(mapper, strip)?;
        }
        Ok(())
    }

    fn georeferenced(&self, mapper: &TransectMapper, strip: &Strip) -> Result<Self, MapError> {
        let mut result = self.clone();
        result.georeference(mapper, strip)?;
        Ok(result)
    }
}

impl<T> Georeference<T> for geo_types::LineString<T>
where
    T: CoordinateType,
{
    type Output = Self;

    fn georeference(&mut self, mapper: &TransectMapper, strip: &Strip) -> Result<(), MapError> {
        mapper.map_array(strip, &mut self.0)?;
        Ok(())
    }

    fn georeferenced(&self, mapper: &TransectMapper, strip: &Strip) -> Result<Self, MapError> {
        let mut result = self.clone();
        result.georeference(mapper, strip)?;
        Ok(result)
    }
}
