pub mod cache;
pub mod memory;
pub mod protocol;
pub mod request;
pub mod source;

pub use cache::*;
pub use memory::*;
pub use protocol::*;
pub use request::*;
pub use source::*;
