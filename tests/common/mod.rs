pub mod fixtures;
pub mod programs;

pub use fixtures::*;
pub use programs::*;
