use scene::parcel::{GeoPoint, Polygon, Properties};
use serde_json::{Map, Value};

/// Parse a GeoJSON geometry object into a polygon.
///
/// `Polygon` is taken as-is; `MultiPolygon` yields its first member.
pub fn parse_polygon_geometry(value: &Value) -> Result<Polygon, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;
    parse_polygon_coordinates(ty, coords)
}

pub fn parse_polygon_coordinates(ty: &str, coords: &Value) -> Result<Polygon, String> {
    match ty {
        "Polygon" => Ok(Polygon::new(parse_rings(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            let first = polys
                .first()
                .ok_or("MultiPolygon has no polygons".to_string())?;
            Ok(Polygon::new(parse_rings(first)?))
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        let arr = ring
            .as_array()
            .ok_or("ring must be an array of positions".to_string())?;
        let mut points = Vec::with_capacity(arr.len());
        for pos in arr {
            points.push(parse_position(pos)?);
        }
        out.push(points);
    }
    Ok(out)
}

fn parse_position(value: &Value) -> Result<GeoPoint, String> {
    let arr = value
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

pub fn polygon_coordinates_value(poly: &Polygon) -> Value {
    Value::Array(
        poly.rings
            .iter()
            .map(|ring| {
                Value::Array(
                    ring.iter()
                        .map(|p| Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)]))
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn polygon_geometry_value(poly: &Polygon) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String("Polygon".to_string()));
    obj.insert("coordinates".to_string(), polygon_coordinates_value(poly));
    Value::Object(obj)
}

/// Canonical `{type: "Feature", geometry: Polygon, properties}` object.
pub fn polygon_feature_value(poly: &Polygon, properties: &Properties, id: Option<u32>) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String("Feature".to_string()));
    if let Some(id) = id {
        obj.insert("id".to_string(), Value::from(id));
    }
    obj.insert("geometry".to_string(), polygon_geometry_value(poly));
    obj.insert("properties".to_string(), Value::Object(properties.clone()));
    Value::Object(obj)
}

pub fn feature_collection_value(features: Vec<Value>) -> Value {
    let mut root = Map::new();
    root.insert(
        "type".to_string(),
        Value::String("FeatureCollection".to_string()),
    );
    root.insert("features".to_string(), Value::Array(features));
    Value::Object(root)
}
