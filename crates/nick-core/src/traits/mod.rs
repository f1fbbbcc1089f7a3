//! Ports (traits) implemented by infrastructure crates

mod ports;

pub use ports::{GuildPlatform, PlatformResult, RemoteDocumentSource, SnapshotStore};
