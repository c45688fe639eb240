pub mod fingerprint;
pub mod hit;
pub mod hover;
pub mod parcel;

pub use fingerprint::*;
pub use hit::*;
pub use hover::*;
pub use parcel::*;
