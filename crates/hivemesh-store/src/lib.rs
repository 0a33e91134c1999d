pub mod memory;
pub mod postgres;
pub mod types;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use types::{NodeStore, RequestStore, StoreError};
