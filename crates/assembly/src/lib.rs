//! Parcel assembly: the session that ties parcel sources, render collections,
//! the viewport cache and pointer interaction to one map view.

pub mod address;
pub mod click;
pub mod config;
pub mod host;
pub mod session;

pub use address::*;
pub use click::*;
pub use config::*;
pub use host::*;
pub use session::*;
