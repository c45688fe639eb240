pub mod boundary;
pub mod geojson;
pub mod wkt;

pub use boundary::*;
pub use geojson::*;
pub use wkt::*;
