//! # nick-platform
//!
//! Infrastructure behind the engine's outward ports.
//!
//! ## Features
//!
//! - **REST client**: [`RestPlatformClient`] talks to a Discord-compatible
//!   HTTP API to enumerate members, read role hierarchies, and edit nicknames
//! - **Member cache**: the last enumerated roster of each guild, used only
//!   when the platform cannot answer a member lookup
//! - **Remote documents**: [`HttpDocumentFetcher`] downloads nickname
//!   documents for remote restores, refusing bodies over a size limit

pub mod cache;
pub mod client;
pub mod fetcher;
pub mod wire;

pub use cache::MemberCache;
pub use client::{RestPlatformClient, AUDIT_LOG_REASON_HEADER};
pub use fetcher::{HttpDocumentFetcher, MAX_DOCUMENT_BYTES};
