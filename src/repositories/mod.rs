//! Repository pattern implementation for data access
//!
//! Row persistence for sneakers sits behind [`Repository`]; the services
//! layer only depends on the trait, so tests can swap in other stores.

pub mod sneaker_store;
pub mod traits;

pub use sneaker_store::{SneakerQuery, SneakerRows, SqliteSneakerStore};
pub use traits::*;
