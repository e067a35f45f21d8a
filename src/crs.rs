use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0:?} is not an EPSG code (expected e.g. \"EPSG:32721\")")]
pub struct CrsParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

/// A projected CRS identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    /// WGS 84 / UTM zone 21S
    pub const UTM_21S: Crs = Crs { epsg: 32721 };

    pub const fn from_epsg(epsg: u32) -> Self {
        Crs { epsg }
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// OGC URN, as used in the GeoJSON `crs` member.
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }

    /// Zone and hemisphere if this is one of the WGS 84 / UTM codes.
    pub fn utm_zone(&self) -> Option<(u8, Hemisphere)> {
        let (base, hemisphere) = match self.epsg {
            32601..=32660 => (32600, Hemisphere::North),
            32701..=32760 => (32700, Hemisphere::South),
            _ => return None,
        };
        Some(((self.epsg - base) as u8, hemisphere))
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::UTM_21S
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)?;
        if let Some((zone, hemisphere)) = self.utm_zone() {
            let letter = match hemisphere {
                Hemisphere::North => 'N',
                Hemisphere::South => 'S',
            };
            write!(f, " (UTM zone {zone}{letter})")?;
        }
        Ok(())
    }
}

impl FromStr for Crs {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
            Some(_) => return Err(CrsParseError(s.to_string())),
            None => trimmed,
        };
        code.trim()
            .parse()
            .map(Crs::from_epsg)
            .map_err(|_| CrsParseError(s.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_utm_21s() {
        let crs = Crs::default();
        assert_eq!(crs.epsg(), 32721);
        assert_eq!(crs.utm_zone(), Some((21, Hemisphere::South)));
        assert_eq!(crs.urn(), "urn:ogc:def:crs:EPSG::32721");
        assert_eq!(crs.to_string(), "EPSG:32721 (UTM zone 21S)");
    }

    #[test]
    fn test_parse() {
        let crs: Crs = "EPSG:32633".parse().unwrap();
        assert_eq!(crs.utm_zone(), Some((33, Hemisphere::North)));
        assert_eq!("epsg:31983".parse::<Crs>().unwrap().epsg(), 31983);
        assert_eq!(" 32722 ".parse::<Crs>().unwrap().epsg(), 32722);
        assert!("ESRI:102033".parse::<Crs>().is_err());
        assert!("EPSG:abc".parse::<Crs>().is_err());
    }

    #[test]
    fn test_non_utm_display() {
        let crs = Crs::from_epsg(31983);
        assert_eq!(crs.utm_zone(), None);
        assert_eq!(crs.to_string(), "EPSG:31983");
    }
}
