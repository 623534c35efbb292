pub mod error;
pub mod facility;
pub mod issue;
pub mod models;
pub mod service;
pub mod store;
pub mod validate;

pub use error::*;
pub use facility::*;
pub use issue::*;
pub use service::*;
pub use store::*;
