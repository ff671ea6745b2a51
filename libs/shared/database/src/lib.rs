pub mod store;

pub use store::{Record, Select, StoreClient, StoreError};
