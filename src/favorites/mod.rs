//! Saved recipes and the storage they persist to.

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, StoragePort};
pub use store::{FavoritesStore, Mutation, FAVORITES_KEY, UNRATED};
