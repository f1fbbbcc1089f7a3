//! Service context - dependency container for services
//!
//! Holds the platform client, the snapshot store, the remote document source,
//! and the per-guild locks shared by every command.

use std::sync::Arc;

use nick_core::{GuildPlatform, RemoteDocumentSource, SnapshotStore};

use super::error::{ServiceError, ServiceResult};
use super::locks::GuildLocks;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    platform: Arc<dyn GuildPlatform>,
    store: Arc<dyn SnapshotStore>,
    documents: Arc<dyn RemoteDocumentSource>,
    locks: Arc<GuildLocks>,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(
        platform: Arc<dyn GuildPlatform>,
        store: Arc<dyn SnapshotStore>,
        documents: Arc<dyn RemoteDocumentSource>,
    ) -> Self {
        Self {
            platform,
            store,
            documents,
            locks: Arc::new(GuildLocks::new()),
        }
    }

    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    /// Get the platform client
    pub fn platform(&self) -> &dyn GuildPlatform {
        self.platform.as_ref()
    }

    /// Get the snapshot store
    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    /// Get the remote document source
    pub fn documents(&self) -> &dyn RemoteDocumentSource {
        self.documents.as_ref()
    }

    /// Get the per-guild locks
    pub fn locks(&self) -> &GuildLocks {
        &self.locks
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("platform", &"dyn GuildPlatform")
            .field("store", &"dyn SnapshotStore")
            .field("documents", &"dyn RemoteDocumentSource")
            .field("locks", &self.locks)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    platform: Option<Arc<dyn GuildPlatform>>,
    store: Option<Arc<dyn SnapshotStore>>,
    documents: Option<Arc<dyn RemoteDocumentSource>>,
    locks: Option<Arc<GuildLocks>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn platform(mut self, platform: Arc<dyn GuildPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn documents(mut self, documents: Arc<dyn RemoteDocumentSource>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Share locks with another context
    pub fn locks(mut self, locks: Arc<GuildLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::MissingDependency` if a port was not provided
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            platform: self
                .platform
                .ok_or(ServiceError::MissingDependency("platform"))?,
            store: self
                .store
                .ok_or(ServiceError::MissingDependency("store"))?,
            documents: self
                .documents
                .ok_or(ServiceError::MissingDependency("documents"))?,
            locks: self.locks.unwrap_or_default(),
        })
    }
}
