pub mod constants;
pub mod error;
pub mod grid;
pub mod math_utils;
pub mod params;
pub mod physics;
pub mod sim;
pub mod sim_op;
pub mod solar;
pub mod temp_utils;
