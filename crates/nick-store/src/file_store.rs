//! File-backed snapshot store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nick_common::config::{StorageConfig, GUILD_PLACEHOLDER};
use nick_core::{DomainError, DomainResult, GuildId, NicknameSnapshot, SnapshotStore};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::naming::ArchiveName;

/// Snapshot store writing one JSON file per guild
///
/// The path template must contain `{}`, which is replaced by the guild id.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    template: String,
}

impl FileSnapshotStore {
    /// Create a store from a path template such as `./state_{}.temp.json`
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Create a store from the storage configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.state_path_template.clone())
    }

    /// Path of the active snapshot for a guild
    pub fn active_path(&self, guild_id: &GuildId) -> PathBuf {
        PathBuf::from(
            self.template
                .replacen(GUILD_PLACEHOLDER, guild_id.as_str(), 1),
        )
    }

    /// Archived snapshots of a guild, oldest first
    pub async fn list_archives(&self, guild_id: &GuildId) -> DomainResult<Vec<PathBuf>> {
        let active = self.active_path(guild_id);
        let Some(active_name) = active.file_name().and_then(|n| n.to_str()) else {
            return Ok(Vec::new());
        };
        let dir = parent_dir(&active);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DomainError::store_io(dir, e)),
        };

        let mut archives = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::store_io(&dir, e))?
        {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = ArchiveName::parse(active_name, file_name) {
                archives.push((name, entry.path()));
            }
        }

        archives.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(archives.into_iter().map(|(_, path)| path).collect())
    }

    /// Archive the active snapshot under a given name, bumping the collision
    /// counter until the name is free
    async fn archive_as(&self, guild_id: &GuildId, name: ArchiveName) -> DomainResult<PathBuf> {
        let active = self.active_path(guild_id);
        if !self.exists(guild_id).await? {
            return Err(DomainError::NoActiveSnapshot(guild_id.clone()));
        }

        let mut name = name;
        let mut target = name.path_for(&active);
        while try_exists(&target).await? {
            name = name.next();
            target = name.path_for(&active);
        }

        tokio::fs::rename(&active, &target)
            .await
            .map_err(|e| DomainError::store_io(&active, e))?;

        info!(
            guild_id = %guild_id,
            archive = %target.display(),
            "Archived nickname snapshot"
        );
        Ok(target)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, guild_id: &GuildId) -> DomainResult<NicknameSnapshot> {
        let path = self.active_path(guild_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(NicknameSnapshot::new()),
            Err(e) => return Err(DomainError::store_io(path, e)),
        };

        NicknameSnapshot::from_json(&bytes).map_err(|e| DomainError::CorruptSnapshot {
            path,
            reason: e.to_string(),
        })
    }

    async fn save(&self, guild_id: &GuildId, snapshot: &NicknameSnapshot) -> DomainResult<()> {
        let path = self.active_path(guild_id);
        let bytes = snapshot.to_json().map_err(|e| DomainError::CorruptSnapshot {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let dir = parent_dir(&path);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DomainError::store_io(&dir, e))?;

        let tmp = temp_path(&path);
        if let Err(e) = write_synced(&tmp, &bytes).await {
            discard(&tmp).await;
            return Err(DomainError::store_io(tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            discard(&tmp).await;
            return Err(DomainError::store_io(path, e));
        }

        debug!(
            guild_id = %guild_id,
            path = %path.display(),
            entries = snapshot.len(),
            "Saved nickname snapshot"
        );
        Ok(())
    }

    async fn exists(&self, guild_id: &GuildId) -> DomainResult<bool> {
        try_exists(&self.active_path(guild_id)).await
    }

    async fn archive(&self, guild_id: &GuildId) -> DomainResult<PathBuf> {
        self.archive_as(guild_id, ArchiveName::at(&chrono::Local::now()))
            .await
    }

    async fn archives(&self, guild_id: &GuildId) -> DomainResult<Vec<PathBuf>> {
        self.list_archives(guild_id).await
    }
}

// ============================================================================
// Filesystem helpers
// ============================================================================

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Sibling temp file, unique per write
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
    PathBuf::from(name)
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove temp snapshot");
        }
    }
}

async fn try_exists(path: &Path) -> DomainResult<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| DomainError::store_io(path, e))
}
