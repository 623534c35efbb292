pub mod camera;
pub mod model;
pub mod viewer;

pub use camera::*;
pub use model::*;
pub use viewer::*;
