use log::warn;
use num_traits::Float;
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;

/// Lateral X value of a strip's centre line in the reference field protocol.
pub const DEFAULT_HALF_WIDTH: f64 = 25.0;

pub trait CoordinateType: Float + Copy + PartialOrd + Debug {}
impl<T: Float + Copy + PartialOrd + Debug> CoordinateType for T {}

/// Called by the mapper to read and build its input and output values.
///
/// For offsets, `x` is the lateral position and `y` the distance along the strip.
pub trait Coord<T>
where
    T: CoordinateType,
{
    fn x(&self) -> T;
    fn y(&self) -> T;
    fn from_xy(x: T, y: T) -> Self;
}

impl<T: CoordinateType> Coord<T> for (T, T) {
    fn x(&self) -> T {
        self.0
    }
    fn y(&self) -> T {
        self.1
    }
    fn from_xy(x: T, y: T) -> Self {
        (x, y)
    }
}

/// Errors raised while mapping offsets on a strip
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("strip {strip_id:?} is degenerate: its endpoints are {length} apart")]
    DegenerateStrip { strip_id: String, length: f64 },
    #[error("offset {offset} along strip {strip_id:?} lies outside [0, {length}]")]
    OffsetOutOfRange {
        strip_id: String,
        offset: f64,
        length: f64,
    },
    #[error("mapping on strip {strip_id:?} produced a non-finite coordinate")]
    NonFiniteResult { strip_id: String },
    #[error("the half-width must be finite, got {0}")]
    InvalidHalfWidth(f64),
    #[error("could not convert a coordinate to or from f64")]
    FloatConversion,
}

/// A straight sampling strip between two projected coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Strip {
    pub id: String,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Strip {
    pub fn new(id: impl Into<String>, start: (f64, f64), end: (f64, f64)) -> Self {
        Strip {
            id: id.into(),
            x0: start.0,
            y0: start.1,
            x1: end.0,
            y1: end.1,
        }
    }

    pub fn start(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }

    pub fn end(&self) -> (f64, f64) {
        (self.x1, self.y1)
    }

    /// Euclidean distance between the endpoints. Not checked for degeneracy.
    pub fn length(&self) -> f64 {
        (self.x1 - self.x0).hypot(self.y1 - self.y0)
    }

    fn frame(&self) -> Result<Frame, MapError> {
        let length = self.length();
        // Also catches NaN and infinite endpoints.
        if !(length > 0.0 && length.is_finite()) {
            return Err(MapError::DegenerateStrip {
                strip_id: self.id.clone(),
                length,
            });
        }
        let unit = ((self.x1 - self.x0) / length, (self.y1 - self.y0) / length);
        Ok(Frame {
            origin: self.start(),
            unit,
            normal: (-unit.1, unit.0),
            length,
        })
    }
}

/// Local axes of a non-degenerate strip.
struct Frame {
    origin: (f64, f64),
    unit: (f64, f64),
    normal: (f64, f64),
    length: f64,
}

/// What to do with a longitudinal offset that falls outside `[0, length]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetPolicy {
    /// Extend the strip line beyond its endpoints.
    #[default]
    Extrapolate,
    /// Extrapolate, and log a warning.
    Warn,
    /// Fail with [`MapError::OffsetOutOfRange`].
    Reject,
}

/// Configures a [`TransectMapper`].
#[derive(Debug, Clone)]
pub struct MapperBuilder {
    half_width: f64,
    offset_policy: OffsetPolicy,
}

impl MapperBuilder {
    pub fn new() -> Self {
        MapperBuilder {
            half_width: DEFAULT_HALF_WIDTH,
            offset_policy: OffsetPolicy::default(),
        }
    }

    /// Set the lateral offset of the strip centre line.
    pub fn half_width(mut self, half_width: f64) -> Self {
        self.half_width = half_width;
        self
    }

    pub fn offset_policy(mut self, policy: OffsetPolicy) -> Self {
        self.offset_policy = policy;
        self
    }

    pub fn build(self) -> Result<TransectMapper, MapError> {
        if !self.half_width.is_finite() {
            return Err(MapError::InvalidHalfWidth(self.half_width));
        }
        Ok(TransectMapper {
            half_width: self.half_width,
            offset_policy: self.offset_policy,
        })
    }
}

impl Default for MapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps strip-relative offsets to absolute coordinates and back.
///
/// An offset `(x, y)` is `y` units along the strip from its start, and `x - half_width`
/// units along the strip's left-hand normal (the direction vector rotated 90°
/// counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransectMapper {
    half_width: f64,
    offset_policy: OffsetPolicy,
}

impl TransectMapper {
    /// A mapper with the given half-width and the default offset policy.
    pub fn new(half_width: f64) -> Result<Self, MapError> {
        MapperBuilder::new().half_width(half_width).build()
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn offset_policy(&self) -> OffsetPolicy {
        self.offset_policy
    }

    /// Map a single offset on `strip` to its absolute position
    ///
    /// # Examples
    ///
    /// ```
    /// use transect_georef::{Strip, TransectMapper};
    ///
    /// let strip = Strip::new("1", (500_000.0, 1_000_000.0), (500_000.0, 1_000_050.0));
    /// let mapper = TransectMapper::new(25.0).unwrap();
    /// let (x, y) = mapper.map(&strip, (25.0, 25.0)).unwrap();
    /// assert_eq!((x, y), (500_000.0, 1_000_025.0));
    /// ```
    pub fn map<C, F>(&self, strip: &Strip, offset: C) -> Result<C, MapError>
    where
        C: Coord<F>,
        F: CoordinateType,
    {
        self.map_coord(strip, &offset)
    }

    fn map_coord<C, F>(&self, strip: &Strip, offset: &C) -> Result<C, MapError>
    where
        C: Coord<F>,
        F: CoordinateType,
    {
        let lateral = offset.x().to_f64().ok_or(MapError::FloatConversion)?;
        let along = offset.y().to_f64().ok_or(MapError::FloatConversion)?;
        let (x, y) = self.map_xy(strip, lateral, along)?;
        Ok(C::from_xy(
            F::from(x).ok_or(MapError::FloatConversion)?,
            F::from(y).ok_or(MapError::FloatConversion)?,
        ))
    }

    /// Map a lateral and a longitudinal offset on `strip` to an absolute `(x, y)`.
    pub fn map_xy(&self, strip: &Strip, lateral: f64, along: f64) -> Result<(f64, f64), MapError> {
        let frame = strip.frame()?;
        self.check_along(strip, &frame, along)?;
        let across = lateral - self.half_width;
        let x = frame.origin.0 + frame.unit.0 * along + frame.normal.0 * across;
        let y = frame.origin.1 + frame.unit.1 * along + frame.normal.1 * across;
        if !(x.is_finite() && y.is_finite()) {
            return Err(MapError::NonFiniteResult {
                strip_id: strip.id.clone(),
            });
        }
        Ok((x, y))
    }

    /// Map a slice of offsets on one strip, replacing them in place.
    ///
    /// Stops at the first failure; earlier elements are left converted.
    pub fn map_array<'a, C, F>(
        &self,
        strip: &Strip,
        offsets: &'a mut [C],
    ) -> Result<&'a mut [C], MapError>
    where
        C: Coord<F>,
        F: CoordinateType,
    {
        for offset in offsets.iter_mut() {
            *offset = self.map_coord(strip, offset)?;
        }
        Ok(offsets)
    }

    /// Inverse of [`map`](Self::map): recover the offset of an absolute position.
    pub fn unmap<C, F>(&self, strip: &Strip, position: C) -> Result<C, MapError>
    where
        C: Coord<F>,
        F: CoordinateType,
    {
        let x = position.x().to_f64().ok_or(MapError::FloatConversion)?;
        let y = position.y().to_f64().ok_or(MapError::FloatConversion)?;
        let (lateral, along) = self.unmap_xy(strip, x, y)?;
        Ok(C::from_xy(
            F::from(lateral).ok_or(MapError::FloatConversion)?,
            F::from(along).ok_or(MapError::FloatConversion)?,
        ))
    }

    /// Project an absolute `(x, y)` onto the strip axes, returning `(lateral, along)`.
    ///
    /// The offset policy is not applied.
    pub fn unmap_xy(&self, strip: &Strip, x: f64, y: f64) -> Result<(f64, f64), MapError> {
        let frame = strip.frame()?;
        let rel = (x - frame.origin.0, y - frame.origin.1);
        let along = rel.0 * frame.unit.0 + rel.1 * frame.unit.1;
        let lateral = rel.0 * frame.normal.0 + rel.1 * frame.normal.1 + self.half_width;
        if !(lateral.is_finite() && along.is_finite()) {
            return Err(MapError::NonFiniteResult {
                strip_id: strip.id.clone(),
            });
        }
        Ok((lateral, along))
    }

    fn check_along(&self, strip: &Strip, frame: &Frame, along: f64) -> Result<(), MapError> {
        if (0.0..=frame.length).contains(&along) || along.is_nan() {
            return Ok(());
        }
        match self.offset_policy {
            OffsetPolicy::Extrapolate => Ok(()),
            OffsetPolicy::Warn => {
                warn!(
                    "offset {} lies outside strip {:?} (length {}), extrapolating",
                    along, strip.id, frame.length
                );
                Ok(())
            }
            OffsetPolicy::Reject => Err(MapError::OffsetOutOfRange {
                strip_id: strip.id.clone(),
                offset: along,
                length: frame.length,
            }),
        }
    }
}

impl Default for TransectMapper {
    fn default() -> Self {
        TransectMapper {
            half_width: DEFAULT_HALF_WIDTH,
            offset_policy: OffsetPolicy::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn north() -> Strip {
        Strip::new("N", (0.0, 0.0), (0.0, 10.0))
    }

    #[test]
    fn test_centre_line_endpoints() {
        let mapper = TransectMapper::default();
        let start = mapper.map(&north(), (25.0, 0.0)).unwrap();
        let end = mapper.map(&north(), (25.0, 10.0)).unwrap();
        assert_relative_eq!(start.0, 0.0);
        assert_relative_eq!(start.1, 0.0);
        assert_relative_eq!(end.0, 0.0);
        assert_relative_eq!(end.1, 10.0);
    }

    #[test]
    fn test_lateral_offset_follows_left_normal() {
        // û = (0, 1), so n̂ = (-1, 0)
        let mapper = TransectMapper::default();
        let (x, y) = mapper.map(&north(), (35.0, 0.0)).unwrap();
        assert_relative_eq!(x, -10.0);
        assert_relative_eq!(y, 0.0);

        let (x, y) = mapper.map(&north(), (15.0, 4.0)).unwrap();
        assert_relative_eq!(x, 10.0);
        assert_relative_eq!(y, 4.0);
    }

    #[test]
    fn test_diagonal_strip() {
        let strip = Strip::new("D", (100.0, 200.0), (103.0, 204.0));
        let mapper = TransectMapper::new(0.0).unwrap();
        let (x, y) = mapper.map_xy(&strip, 5.0, 5.0).unwrap();
        // base = (103, 204), n̂ = (-0.8, 0.6)
        assert_relative_eq!(x, 99.0, epsilon = 1e-9);
        assert_relative_eq!(y, 207.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let strips = [
            north(),
            Strip::new("a", (512_345.6, 6_123_456.7), (512_380.2, 6_123_420.1)),
            Strip::new("b", (-3.0, 7.5), (-90.0, -41.25)),
        ];
        let mapper = TransectMapper::default();
        for strip in &strips {
            for &offset in &[(0.0, 0.0), (25.0, 12.5), (49.9, 3.3), (-7.0, 120.0)] {
                let absolute = mapper.map(strip, offset).unwrap();
                let back = mapper.unmap(strip, absolute).unwrap();
                assert_relative_eq!(back.0, offset.0, epsilon = 1e-6);
                assert_relative_eq!(back.1, offset.1, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_composition_is_additive() {
        let strip = Strip::new("s", (10.0, 20.0), (40.0, 60.0));
        let mapper = TransectMapper::default();
        let single = mapper.map_xy(&strip, 30.0, 10.0).unwrap();
        let doubled = mapper.map_xy(&strip, 60.0, 20.0).unwrap();
        let scaled = (2.0 * single.0, 2.0 * single.1);
        assert!((doubled.0 - scaled.0).abs() > 1e-6 || (doubled.1 - scaled.1).abs() > 1e-6);

        // Displacement from the start is linear in (x - half_width, y).
        let origin = mapper.map_xy(&strip, 25.0, 0.0).unwrap();
        let along = mapper.map_xy(&strip, 25.0, 10.0).unwrap();
        let across = mapper.map_xy(&strip, 30.0, 0.0).unwrap();
        assert_relative_eq!(single.0, along.0 + across.0 - origin.0, epsilon = 1e-9);
        assert_relative_eq!(single.1, along.1 + across.1 - origin.1, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_strip() {
        let strip = Strip::new("zero", (5.0, 5.0), (5.0, 5.0));
        let err = TransectMapper::default().map(&strip, (25.0, 0.0)).unwrap_err();
        assert_eq!(
            err,
            MapError::DegenerateStrip {
                strip_id: "zero".to_string(),
                length: 0.0
            }
        );
    }

    #[test]
    fn test_nan_endpoint_is_degenerate() {
        let strip = Strip::new("nan", (f64::NAN, 0.0), (1.0, 1.0));
        let err = TransectMapper::default().map_xy(&strip, 25.0, 0.0).unwrap_err();
        assert!(matches!(err, MapError::DegenerateStrip { .. }));
    }

    #[test]
    fn test_nan_offset_never_returned() {
        let err = TransectMapper::default()
            .map_xy(&north(), f64::NAN, 1.0)
            .unwrap_err();
        assert_eq!(
            err,
            MapError::NonFiniteResult {
                strip_id: "N".to_string()
            }
        );
    }

    #[test]
    fn test_offset_policies() {
        let strip = north();
        let extrapolate = TransectMapper::default();
        let (_, y) = extrapolate.map_xy(&strip, 25.0, 15.0).unwrap();
        assert_relative_eq!(y, 15.0);

        let warn = MapperBuilder::new()
            .offset_policy(OffsetPolicy::Warn)
            .build()
            .unwrap();
        let (_, y) = warn.map_xy(&strip, 25.0, -2.0).unwrap();
        assert_relative_eq!(y, -2.0);

        let reject = MapperBuilder::new()
            .offset_policy(OffsetPolicy::Reject)
            .build()
            .unwrap();
        assert!(reject.map_xy(&strip, 25.0, 10.0).is_ok());
        assert_eq!(
            reject.map_xy(&strip, 25.0, 10.5).unwrap_err(),
            MapError::OffsetOutOfRange {
                strip_id: "N".to_string(),
                offset: 10.5,
                length: 10.0
            }
        );
    }

    #[test]
    fn test_builder_rejects_infinite_half_width() {
        let err = MapperBuilder::new()
            .half_width(f64::INFINITY)
            .build()
            .unwrap_err();
        assert_eq!(err, MapError::InvalidHalfWidth(f64::INFINITY));
    }

    #[test]
    fn test_map_array_f32() {
        let mapper = TransectMapper::default();
        let mut offsets = [(25.0f32, 0.0f32), (25.0, 5.0), (20.0, 10.0)];
        mapper.map_array(&north(), &mut offsets).unwrap();
        assert_relative_eq!(offsets[1].1, 5.0f32);
        assert_relative_eq!(offsets[2].0, 5.0f32);
        assert_relative_eq!(offsets[2].1, 10.0f32);
    }
}
