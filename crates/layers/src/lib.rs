pub mod labels;
pub mod position;

pub use labels::*;
pub use position::*;
