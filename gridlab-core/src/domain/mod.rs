//! Domain types for GridLab

pub mod bar;
pub mod leg;

pub use bar::Bar;
pub use leg::{position_risk, Direction, Leg, LegError};
