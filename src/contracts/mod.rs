pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{InsertOutcome, NumberStore};
