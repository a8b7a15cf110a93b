//! Durable round-snapshot storage

mod file_store;

pub use file_store::FileSnapshotStore;
