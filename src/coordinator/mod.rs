pub mod events;
pub mod grid_safety;

pub use events::*;
pub use grid_safety::GridSafetyCoordinator;
