pub mod collection;
pub mod main_parcels;
pub mod merge;
pub mod surrounding;

pub use collection::*;
pub use main_parcels::*;
pub use merge::*;
pub use surrounding::*;
