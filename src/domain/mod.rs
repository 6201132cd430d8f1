pub mod connection_group;
pub mod planboard;
pub mod time_slice;

pub use connection_group::*;
pub use planboard::*;
pub use time_slice::*;
