pub mod grid_cell;
pub mod grid_mapper;
pub mod grid_state;

pub use grid_cell::{Cell, IceState};
pub use grid_mapper::GridMapper;
pub use grid_state::{GridState, GridStatistics};
