pub mod error;
pub mod memory;
pub mod store;
pub mod testing;
pub mod types;

pub use error::StorageError;
pub use memory::{MemoryObjectStore, StoreCall, StoredObject};
pub use store::{DynObjectStore, ObjectStore};
pub use types::{ObjectInfo, WriteRequest};
