pub mod hash;
pub mod model;
pub mod reconcile;
pub mod store;

pub use model::Cache;
pub use reconcile::{backlog, merge, reconcile};
