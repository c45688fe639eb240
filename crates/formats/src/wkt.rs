//! WKT boundaries through the georust `wkt` reader.
//!
//! Accepts `POLYGON` and `MULTIPOLYGON` in any case, with an optional `SRID=n;`
//! prefix and optional `Z`/`M`/`ZM` tag. Ordinates beyond x/y are dropped. A
//! multipolygon yields its first member.

use std::str::FromStr;

use scene::parcel::{GeoPoint, Polygon};
use wkt::Wkt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WktError {
    UnsupportedType(&'static str),
    Empty,
    Syntax(String),
}

impl std::fmt::Display for WktError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WktError::UnsupportedType(t) => write!(f, "unsupported WKT geometry type: {t}"),
            WktError::Empty => write!(f, "WKT geometry is EMPTY"),
            WktError::Syntax(reason) => write!(f, "WKT syntax error: {reason}"),
        }
    }
}

impl std::error::Error for WktError {}

pub fn parse_wkt_polygon(input: &str) -> Result<Polygon, WktError> {
    let body = strip_srid(input.trim()).to_ascii_uppercase();
    let geometry = Wkt::<f64>::from_str(&body).map_err(|e| WktError::Syntax(e.to_string()))?;

    let polygon = match geometry {
        Wkt::Polygon(p) => p,
        Wkt::MultiPolygon(mp) => mp.0.into_iter().next().ok_or(WktError::Empty)?,
        Wkt::Point(_) => return Err(WktError::UnsupportedType("POINT")),
        Wkt::LineString(_) => return Err(WktError::UnsupportedType("LINESTRING")),
        Wkt::MultiPoint(_) => return Err(WktError::UnsupportedType("MULTIPOINT")),
        Wkt::MultiLineString(_) => return Err(WktError::UnsupportedType("MULTILINESTRING")),
        Wkt::GeometryCollection(_) => {
            return Err(WktError::UnsupportedType("GEOMETRYCOLLECTION"));
        }
    };

    let rings: Vec<Vec<GeoPoint>> = polygon
        .0
        .into_iter()
        .map(|ring| ring.0.into_iter().map(|c| GeoPoint::new(c.x, c.y)).collect())
        .collect();
    if rings.first().is_none_or(Vec::is_empty) {
        return Err(WktError::Empty);
    }
    Ok(Polygon::new(rings))
}

/// PostGIS EWKT prefix; the reader itself only knows plain WKT.
fn strip_srid(s: &str) -> &str {
    let has_srid = s.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("SRID="));
    match s.find(';') {
        Some(idx) if has_srid => s[idx + 1..].trim_start(),
        _ => s,
    }
}
