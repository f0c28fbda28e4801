pub mod storage;

pub use storage::{BoxReader, ContentHash, MediaStore, StorageError};
