/// Geographic bounding box in WGS84 degrees.
///
/// Wire order is `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBbox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBbox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn from_array(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
            && self.min_lon <= self.max_lon
            && self.min_lat <= self.max_lat
    }

    /// Returns true if `inner` lies within `self`, allowing each edge of
    /// `inner` to overshoot by up to `tolerance_deg`.
    pub fn contains_with_tolerance(&self, inner: &GeoBbox, tolerance_deg: f64) -> bool {
        inner.min_lon >= self.min_lon - tolerance_deg
            && inner.min_lat >= self.min_lat - tolerance_deg
            && inner.max_lon <= self.max_lon + tolerance_deg
            && inner.max_lat <= self.max_lat + tolerance_deg
    }

    pub fn contains(&self, inner: &GeoBbox) -> bool {
        self.contains_with_tolerance(inner, 0.0)
    }

    /// Query-string form used by the nearby-parcels endpoint.
    pub fn to_query_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

impl std::fmt::Display for GeoBbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.6},{:.6},{:.6},{:.6}]",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}
