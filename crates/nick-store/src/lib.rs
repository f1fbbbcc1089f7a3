//! # nick-store
//!
//! File-backed persistence for nickname snapshots.
//!
//! One active snapshot per guild lives at a path derived from a template
//! (`./state_{}.temp.json` by default). Restoring consumes the snapshot by
//! renaming it to a timestamped `.archive` file next to it.
//!
//! ## Example
//!
//! ```ignore
//! use nick_store::FileSnapshotStore;
//!
//! let store = FileSnapshotStore::from_config(&config.storage);
//! let snapshot = store.load(&guild_id).await?;
//! store.save(&guild_id, &snapshot).await?;
//! let archived = store.archive(&guild_id).await?;
//! ```

pub mod file_store;
pub mod naming;

pub use file_store::FileSnapshotStore;
pub use naming::{ArchiveName, ARCHIVE_EXTENSION, ARCHIVE_TIMESTAMP_FORMAT};
