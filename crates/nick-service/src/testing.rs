//! In-memory collaborators for exercising the engine
//!
//! [`InMemoryPlatform`] stands in for the chat platform: several guilds,
//! members that are cached or only reachable by fetch, injectable rename
//! failures, and a record of every rename and notice it accepted.
//! [`MemoryStore`] and [`ScriptedDocuments`] cover the other two ports.
//!
//! Built for this crate's unit tests and, behind the `testing` feature, for
//! the workspace integration tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nick_core::{
    DomainError, DomainResult, GuildId, GuildMember, GuildPlatform, MemberId, NicknameSnapshot,
    Permissions, PlatformError, PlatformResult, RemoteDocumentSource, Role, RoleHierarchy, RoleId,
    SnapshotStore,
};

use crate::services::ServiceContext;

/// User id the bot runs as in every fake guild
pub const BOT_ID: &str = "900";

/// Guild used by [`Harness`] and single-guild setups
pub const GUILD: &str = "1";

pub fn guild_id(raw: &str) -> GuildId {
    GuildId::parse(raw).unwrap()
}

pub fn member_id(raw: &str) -> MemberId {
    MemberId::parse(raw).unwrap()
}

/// A rename the platform accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub guild_id: GuildId,
    pub member_id: MemberId,
    pub nickname: Option<String>,
    pub reason: String,
}

// ============================================================================
// Chat Platform
// ============================================================================

#[derive(Default)]
struct GuildState {
    owner: Option<MemberId>,
    everyone: Permissions,
    roles: Vec<Role>,
    members: Vec<GuildMember>,
    remote_only: HashSet<MemberId>,
    failing: HashSet<MemberId>,
    unreachable: bool,
    notices_fail: bool,
}

impl GuildState {
    fn rank_role(&mut self, position: i32, admin: bool) -> RoleId {
        let id = if admin {
            RoleId::parse(&format!("admin{position}")).unwrap()
        } else {
            RoleId::parse(&format!("rank{position}")).unwrap()
        };
        if !self.roles.iter().any(|r| r.id == id) {
            let permissions = if admin {
                Permissions::ADMINISTRATOR
            } else {
                Permissions::empty()
            };
            self.roles
                .push(Role::new(id.clone(), id.as_str(), position, permissions));
        }
        id
    }

    fn member_mut(&mut self, id: &MemberId) -> &mut GuildMember {
        self.members
            .iter_mut()
            .find(|m| &m.user_id == id)
            .unwrap_or_else(|| panic!("no member {id}"))
    }

    fn check_reachable(&self) -> PlatformResult<()> {
        if self.unreachable {
            Err(PlatformError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct PlatformState {
    guilds: BTreeMap<GuildId, GuildState>,
    renames: Vec<Rename>,
    notices: Vec<(GuildId, String)>,
    fetched: Vec<MemberId>,
}

impl PlatformState {
    fn guild(&self, guild_id: &GuildId) -> PlatformResult<&GuildState> {
        let guild = self
            .guilds
            .get(guild_id)
            .ok_or_else(|| PlatformError::rejected(404, "Unknown Guild"))?;
        guild.check_reachable()?;
        Ok(guild)
    }
}

/// Multi-guild chat platform kept in memory
#[derive(Default)]
pub struct InMemoryPlatform {
    state: Mutex<PlatformState>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform holding only [`GUILD`], with the bot at `bot_position`
    pub fn single_guild(bot_position: i32) -> Self {
        let platform = Self::new();
        platform.add_guild(GUILD, bot_position);
        platform
    }

    fn with_guild<T>(&self, guild: &str, f: impl FnOnce(&mut GuildState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        let guild = state
            .guilds
            .get_mut(&guild_id(guild))
            .unwrap_or_else(|| panic!("no guild {guild}"));
        f(guild)
    }

    /// Add a guild whose bot holds every required permission at `bot_position`
    pub fn add_guild(&self, guild: &str, bot_position: i32) -> &Self {
        let gid = guild_id(guild);
        let mut g = GuildState {
            everyone: Permissions::BOT_REQUIRED,
            ..GuildState::default()
        };
        let role = g.rank_role(bot_position, false);
        let mut bot = GuildMember::new(gid.clone(), member_id(BOT_ID)).with_roles(vec![role]);
        bot.bot = true;
        g.members.push(bot);
        self.state.lock().unwrap().guilds.insert(gid, g);
        self
    }

    /// Add a member holding one plain role at `position`
    pub fn add_member(&self, guild: &str, id: &str, nickname: Option<&str>, position: i32) -> &Self {
        let gid = guild_id(guild);
        self.with_guild(guild, |g| {
            let role = g.rank_role(position, false);
            let mut member = GuildMember::new(gid, member_id(id)).with_roles(vec![role]);
            member.nickname = nickname.map(str::to_string);
            g.members.push(member);
        });
        self
    }

    /// Add a member holding an administrator role at `position`
    pub fn add_admin(&self, guild: &str, id: &str, position: i32) -> &Self {
        let gid = guild_id(guild);
        self.with_guild(guild, |g| {
            let role = g.rank_role(position, true);
            g.members
                .push(GuildMember::new(gid, member_id(id)).with_roles(vec![role]));
        });
        self
    }

    /// Add another bot account, with administrator rights
    pub fn add_bot_account(&self, guild: &str, id: &str, position: i32) -> &Self {
        self.add_admin(guild, id, position);
        self.with_guild(guild, |g| g.member_mut(&member_id(id)).bot = true);
        self
    }

    pub fn set_owner(&self, guild: &str, id: &str) {
        self.with_guild(guild, |g| g.owner = Some(member_id(id)));
    }

    /// Permissions every member (the bot included) gets from the everyone role
    pub fn set_everyone_permissions(&self, guild: &str, permissions: Permissions) {
        self.with_guild(guild, |g| g.everyone = permissions);
    }

    /// Keep a member out of the cache; it can only be fetched
    pub fn make_remote_only(&self, guild: &str, id: &str) {
        self.with_guild(guild, |g| {
            g.remote_only.insert(member_id(id));
        });
    }

    pub fn fail_renames_of(&self, guild: &str, id: &str) {
        self.with_guild(guild, |g| {
            g.failing.insert(member_id(id));
        });
    }

    /// Reject every message posted to the guild
    pub fn fail_notices(&self, guild: &str) {
        self.with_guild(guild, |g| g.notices_fail = true);
    }

    pub fn set_unreachable(&self, guild: &str, unreachable: bool) {
        self.with_guild(guild, |g| g.unreachable = unreachable);
    }

    pub fn remove_member(&self, guild: &str, id: &str) {
        let id = member_id(id);
        self.with_guild(guild, |g| g.members.retain(|m| m.user_id != id));
    }

    /// Move a member (or the bot) to a plain role at `position`
    pub fn set_position(&self, guild: &str, id: &str, position: i32) {
        self.with_guild(guild, |g| {
            let role = g.rank_role(position, false);
            g.member_mut(&member_id(id)).role_ids = vec![role];
        });
    }

    /// Change a member's live nickname behind the bot's back
    pub fn set_live_nickname(&self, guild: &str, id: &str, nickname: Option<&str>) {
        self.with_guild(guild, |g| {
            g.member_mut(&member_id(id)).nickname = nickname.map(str::to_string);
        });
    }

    pub fn nickname_of(&self, guild: &str, id: &str) -> Option<String> {
        self.with_guild(guild, |g| g.member_mut(&member_id(id)).nickname.clone())
    }

    /// Every accepted rename, in order
    pub fn renames(&self) -> Vec<Rename> {
        self.state.lock().unwrap().renames.clone()
    }

    /// Every message posted, as (guild, text)
    pub fn notices(&self) -> Vec<(GuildId, String)> {
        self.state.lock().unwrap().notices.clone()
    }

    /// Members resolved through a network fetch, in order
    pub fn fetched(&self) -> Vec<MemberId> {
        self.state.lock().unwrap().fetched.clone()
    }
}

#[async_trait]
impl GuildPlatform for InMemoryPlatform {
    async fn guilds(&self) -> PlatformResult<Vec<GuildId>> {
        Ok(self.state.lock().unwrap().guilds.keys().cloned().collect())
    }

    async fn members(&self, guild_id: &GuildId) -> PlatformResult<Vec<GuildMember>> {
        let state = self.state.lock().unwrap();
        Ok(state.guild(guild_id)?.members.clone())
    }

    async fn current_member(&self, guild_id: &GuildId) -> PlatformResult<GuildMember> {
        let state = self.state.lock().unwrap();
        let bot = member_id(BOT_ID);
        state
            .guild(guild_id)?
            .members
            .iter()
            .find(|m| m.user_id == bot)
            .cloned()
            .ok_or_else(|| PlatformError::rejected(404, "Unknown Member"))
    }

    async fn role_hierarchy(&self, guild_id: &GuildId) -> PlatformResult<RoleHierarchy> {
        let state = self.state.lock().unwrap();
        let guild = state.guild(guild_id)?;

        let mut roles = guild.roles.clone();
        roles.push(Role::new(
            RoleId::everyone(guild_id),
            "@everyone",
            0,
            guild.everyone,
        ));
        let hierarchy = RoleHierarchy::new(guild_id.clone(), roles);
        Ok(match &guild.owner {
            Some(owner) => hierarchy.with_owner(owner.clone()),
            None => hierarchy,
        })
    }

    fn cached_member(&self, guild_id: &GuildId, user_id: &MemberId) -> Option<GuildMember> {
        let state = self.state.lock().unwrap();
        let guild = state.guilds.get(guild_id)?;
        if guild.remote_only.contains(user_id) {
            return None;
        }
        guild.members.iter().find(|m| &m.user_id == user_id).cloned()
    }

    async fn fetch_member(
        &self,
        guild_id: &GuildId,
        user_id: &MemberId,
    ) -> PlatformResult<Option<GuildMember>> {
        let mut state = self.state.lock().unwrap();
        state.fetched.push(user_id.clone());
        let guild = state.guild(guild_id)?;
        Ok(guild.members.iter().find(|m| &m.user_id == user_id).cloned())
    }

    async fn set_nickname(
        &self,
        guild_id: &GuildId,
        user_id: &MemberId,
        nickname: Option<&str>,
        reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock().unwrap();
        let guild = state
            .guilds
            .get_mut(guild_id)
            .ok_or_else(|| PlatformError::rejected(404, "Unknown Guild"))?;
        guild.check_reachable()?;
        if guild.failing.contains(user_id) {
            return Err(PlatformError::rejected(403, "Missing Permissions"));
        }
        let member = guild
            .members
            .iter_mut()
            .find(|m| &m.user_id == user_id)
            .ok_or_else(|| PlatformError::rejected(404, "Unknown Member"))?;
        member.nickname = nickname.map(str::to_string);

        state.renames.push(Rename {
            guild_id: guild_id.clone(),
            member_id: user_id.clone(),
            nickname: nickname.map(str::to_string),
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn notify(&self, guild_id: &GuildId, message: &str) -> PlatformResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.guild(guild_id)?.notices_fail {
            return Err(PlatformError::rejected(403, "Missing Access"));
        }
        state.notices.push((guild_id.clone(), message.to_string()));
        Ok(())
    }
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Snapshot store kept in memory
#[derive(Default)]
pub struct MemoryStore {
    active: Mutex<HashMap<GuildId, NicknameSnapshot>>,
    archived: Mutex<Vec<(GuildId, NicknameSnapshot)>>,
    corrupt: Mutex<HashSet<GuildId>>,
}

impl MemoryStore {
    pub fn active(&self, guild_id: &GuildId) -> Option<NicknameSnapshot> {
        self.active.lock().unwrap().get(guild_id).cloned()
    }

    pub fn archived(&self) -> Vec<(GuildId, NicknameSnapshot)> {
        self.archived.lock().unwrap().clone()
    }

    /// Seed an active snapshot directly
    pub fn put(&self, guild_id: &GuildId, snapshot: NicknameSnapshot) {
        self.active.lock().unwrap().insert(guild_id.clone(), snapshot);
    }

    /// Make the guild's active snapshot unreadable
    pub fn corrupt(&self, guild_id: &GuildId) {
        self.corrupt.lock().unwrap().insert(guild_id.clone());
        self.put(guild_id, NicknameSnapshot::new());
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self, guild_id: &GuildId) -> DomainResult<NicknameSnapshot> {
        if self.corrupt.lock().unwrap().contains(guild_id) {
            return Err(DomainError::CorruptSnapshot {
                path: PathBuf::from(format!("state_{guild_id}.temp.json")),
                reason: "expected value at line 1 column 1".to_string(),
            });
        }
        Ok(self.active(guild_id).unwrap_or_default())
    }

    async fn save(&self, guild_id: &GuildId, snapshot: &NicknameSnapshot) -> DomainResult<()> {
        self.put(guild_id, snapshot.clone());
        Ok(())
    }

    async fn exists(&self, guild_id: &GuildId) -> DomainResult<bool> {
        Ok(self.active.lock().unwrap().contains_key(guild_id))
    }

    async fn archive(&self, guild_id: &GuildId) -> DomainResult<PathBuf> {
        let snapshot = self
            .active
            .lock()
            .unwrap()
            .remove(guild_id)
            .ok_or_else(|| DomainError::NoActiveSnapshot(guild_id.clone()))?;
        let mut archived = self.archived.lock().unwrap();
        archived.push((guild_id.clone(), snapshot));
        Ok(PathBuf::from(format!(
            "state_{guild_id}.temp.json_{}.archive",
            archived.len()
        )))
    }

    async fn archives(&self, guild_id: &GuildId) -> DomainResult<Vec<PathBuf>> {
        let count = self
            .archived
            .lock()
            .unwrap()
            .iter()
            .filter(|(g, _)| g == guild_id)
            .count();
        Ok((1..=count)
            .map(|n| PathBuf::from(format!("state_{guild_id}.temp.json_{n}.archive")))
            .collect())
    }
}

// ============================================================================
// Remote Documents
// ============================================================================

/// Document source answering from a fixed table
#[derive(Default)]
pub struct ScriptedDocuments {
    documents: Mutex<HashMap<String, Vec<u8>>>,
}

impl ScriptedDocuments {
    pub fn serve(&self, location: &str, body: &str) {
        self.documents
            .lock()
            .unwrap()
            .insert(location.to_string(), body.as_bytes().to_vec());
    }
}

#[async_trait]
impl RemoteDocumentSource for ScriptedDocuments {
    async fn fetch(&self, location: &str) -> DomainResult<Vec<u8>> {
        self.documents
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| DomainError::RemoteFetchFailed(format!("{location} returned 404")))
    }
}

/// A service context over all three fakes, each kept for inspection
pub struct Harness {
    pub platform: Arc<InMemoryPlatform>,
    pub store: Arc<MemoryStore>,
    pub documents: Arc<ScriptedDocuments>,
    pub ctx: ServiceContext,
}

impl Harness {
    pub fn new(platform: InMemoryPlatform) -> Self {
        let platform = Arc::new(platform);
        let store = Arc::new(MemoryStore::default());
        let documents = Arc::new(ScriptedDocuments::default());
        let ctx = ServiceContext::new(platform.clone(), store.clone(), documents.clone());
        Self {
            platform,
            store,
            documents,
            ctx,
        }
    }

    /// The id of [`GUILD`]
    pub fn guild(&self) -> GuildId {
        guild_id(GUILD)
    }
}
