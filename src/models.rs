//! # Data Model
//!
//! DTOs handed to views, the snake_case wire shapes they are mapped from, and
//! the explicit patch types the state stores merge with.
//!
//! ## Level and Rank
//!
//! A user's privilege tier is exchanged both as a level name (`user`,
//! `admin`, `senior_admin`, `superuser`) and as a rank where a lower number
//! means more privilege (`superuser` = 0 … `user` = 3). [`LEVEL_RANKS`] is the
//! only place the two are related; DTOs always derive the rank from the level.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, AppResult};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserLevel {
    User,
    Admin,
    SeniorAdmin,
    Superuser,
}

/// Numeric privilege rank, 0 is the most privileged.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct UserRank(u8);

/// The level/rank lookup table, least privileged first.
pub const LEVEL_RANKS: [(UserLevel, UserRank); 4] = [
    (UserLevel::User, UserRank(3)),
    (UserLevel::Admin, UserRank(2)),
    (UserLevel::SeniorAdmin, UserRank(1)),
    (UserLevel::Superuser, UserRank(0)),
];

impl UserLevel {
    /// All levels in the order they are offered to an administrator.
    pub const ALL: [UserLevel; 4] = [
        UserLevel::User,
        UserLevel::Admin,
        UserLevel::SeniorAdmin,
        UserLevel::Superuser,
    ];

    pub fn rank(self) -> UserRank {
        LEVEL_RANKS
            .iter()
            .find(|(level, _)| *level == self)
            .map(|(_, rank)| *rank)
            .unwrap_or(UserRank::USER)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserLevel::User => "user",
            UserLevel::Admin => "admin",
            UserLevel::SeniorAdmin => "senior_admin",
            UserLevel::Superuser => "superuser",
        }
    }
}

impl fmt::Display for UserLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown user level '{}'", s))
    }
}

impl UserRank {
    pub const SUPERUSER: UserRank = UserRank(0);
    pub const SENIOR_ADMIN: UserRank = UserRank(1);
    pub const ADMIN: UserRank = UserRank(2);
    pub const USER: UserRank = UserRank(3);

    /// Returns the rank for `value`, or `None` outside `0..=3`.
    pub fn new(value: u8) -> Option<Self> {
        (value <= 3).then_some(UserRank(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn level(self) -> UserLevel {
        LEVEL_RANKS
            .iter()
            .find(|(_, rank)| *rank == self)
            .map(|(level, _)| *level)
            .unwrap_or(UserLevel::User)
    }
}

impl TryFrom<u8> for UserRank {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        UserRank::new(value).ok_or_else(|| format!("rank {} out of range 0..=3", value))
    }
}

impl From<UserRank> for u8 {
    fn from(rank: UserRank) -> Self {
        rank.0
    }
}

/// The signed-in user, or any user as the backend describes them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub level: UserLevel,
    pub rank: UserRank,
    pub storage_rel_path: String,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct UserWire {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub level: UserLevel,
    #[serde(default)]
    pub rank: Option<u8>,
    #[serde(default)]
    pub storage_rel_path: String,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        let rank = wire.level.rank();
        if wire.rank.is_some_and(|r| r != rank.value()) {
            tracing::warn!(
                user_id = wire.id,
                level = %wire.level,
                wire_rank = ?wire.rank,
                "backend rank disagrees with level, using level"
            );
        }
        Self {
            id: wire.id,
            username: wire.username,
            full_name: wire.full_name,
            email: wire.email,
            is_admin: wire.is_admin,
            is_staff: wire.is_staff,
            is_superuser: wire.is_superuser,
            level: wire.level,
            rank,
            storage_rel_path: wire.storage_rel_path,
        }
    }
}

/// Public share link of a file. A file is shared iff it has one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: u64,
    pub original_name: String,
    pub size_bytes: u64,
    pub comment: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub last_downloaded_at: Option<DateTime<Utc>>,
    pub share: Option<ShareLink>,
}

impl FileEntry {
    pub fn share_url(&self) -> Option<&str> {
        self.share.as_ref().map(|s| s.url.as_str())
    }

    pub fn share_created_at(&self) -> Option<DateTime<Utc>> {
        self.share.as_ref().map(|s| s.created_at)
    }

    pub fn is_shared(&self) -> bool {
        self.share.is_some()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct FileWire {
    pub id: u64,
    pub original_name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub comment: Option<String>,
    pub uploaded: DateTime<Utc>,
    #[serde(default)]
    pub last_downloaded: Option<DateTime<Utc>>,
    #[serde(default)]
    pub share_url: Option<String>,
    #[serde(default)]
    pub share_created: Option<DateTime<Utc>>,
}

impl TryFrom<FileWire> for FileEntry {
    type Error = ApiError;

    fn try_from(wire: FileWire) -> AppResult<Self> {
        Ok(Self {
            id: wire.id,
            original_name: wire.original_name,
            size_bytes: wire.size_bytes,
            comment: wire.comment,
            uploaded_at: wire.uploaded,
            last_downloaded_at: wire.last_downloaded,
            share: share_from_wire(wire.id, wire.share_url, wire.share_created)?,
        })
    }
}

fn share_from_wire(
    file_id: u64,
    url: Option<String>,
    created_at: Option<DateTime<Utc>>,
) -> AppResult<Option<ShareLink>> {
    match (url, created_at) {
        (Some(url), Some(created_at)) => Ok(Some(ShareLink { url, created_at })),
        (None, _) => Ok(None),
        (Some(_), None) => Err(ApiError::Decode(format!(
            "file {} has a share_url without share_created",
            file_id
        ))),
    }
}

/// Result of `PATCH /files/{id}/rename/`.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RenamedFile {
    pub id: u64,
    pub original_name: String,
}

/// Result of `PATCH /files/{id}/comment/`.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommentedFile {
    pub id: u64,
    pub comment: Option<String>,
}

/// Share state of a file after enabling or disabling its link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareUpdate {
    pub file_id: u64,
    pub share: Option<ShareLink>,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct ShareWire {
    pub id: u64,
    #[serde(default)]
    pub share_url: Option<String>,
    #[serde(default)]
    pub share_created: Option<DateTime<Utc>>,
}

impl TryFrom<ShareWire> for ShareUpdate {
    type Error = ApiError;

    fn try_from(wire: ShareWire) -> AppResult<Self> {
        Ok(Self {
            file_id: wire.id,
            share: share_from_wire(wire.id, wire.share_url, wire.share_created)?,
        })
    }
}

/// A roster entry as seen by administrators.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: User,
    pub files_count: u64,
    pub total_storage_bytes: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct AdminUserWire {
    #[serde(flatten)]
    pub user: UserWire,
    #[serde(default)]
    pub files_count: u64,
    #[serde(default)]
    pub total_storage_bytes: u64,
}

impl From<AdminUserWire> for AdminUser {
    fn from(wire: AdminUserWire) -> Self {
        Self {
            user: wire.user.into(),
            files_count: wire.files_count,
            total_storage_bytes: wire.total_storage_bytes,
        }
    }
}

/// The fields a successful level change reports for the affected user.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelChange {
    pub user_id: u64,
    pub level: UserLevel,
    pub rank: UserRank,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl LevelChange {
    /// Overwrites the level, rank and role flags of `user`.
    pub fn apply_to(&self, user: &mut User) {
        user.level = self.level;
        user.rank = self.rank;
        user.is_admin = self.is_admin;
        user.is_staff = self.is_staff;
        user.is_superuser = self.is_superuser;
    }
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct LevelChangeWire {
    pub user: UserWire,
}

impl From<LevelChangeWire> for LevelChange {
    fn from(wire: LevelChangeWire) -> Self {
        let user: User = wire.user.into();
        Self {
            user_id: user.id,
            level: user.level,
            rank: user.rank,
            is_admin: user.is_admin,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}

/// Result of deleting a user account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteUserOutcome {
    pub user_id: u64,
    pub detail: String,
    /// Whether the backend also removed the user's stored files. Informational only.
    pub files_deleted: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct DeleteUserWire {
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub files_deleted: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    /// The form as it is sent: surrounding whitespace is dropped from the username.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            password: self.password,
        }
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// The form as it is validated and sent: every field but the password is trimmed.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

/// Account created by `POST /auth/register/`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegisteredUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub level: Option<UserLevel>,
    #[serde(default)]
    pub storage_rel_path: String,
}

/// A file to upload together with its optional comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub comment: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DownloadMode {
    #[default]
    Attachment,
    Preview,
}

/// One field of a merge: leave it alone, or overwrite it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Unset,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    pub fn apply(self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value;
        }
    }
}

/// Field-wise update of a [`FileEntry`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilePatch {
    pub original_name: Patch<String>,
    pub comment: Patch<Option<String>>,
    pub share: Patch<Option<ShareLink>>,
    pub last_downloaded_at: Patch<Option<DateTime<Utc>>>,
}

impl FilePatch {
    pub fn apply_to(self, file: &mut FileEntry) {
        self.original_name.apply(&mut file.original_name);
        self.comment.apply(&mut file.comment);
        self.share.apply(&mut file.share);
        self.last_downloaded_at.apply(&mut file.last_downloaded_at);
    }
}

impl From<RenamedFile> for FilePatch {
    fn from(renamed: RenamedFile) -> Self {
        Self {
            original_name: Patch::Set(renamed.original_name),
            ..Self::default()
        }
    }
}

impl From<CommentedFile> for FilePatch {
    fn from(commented: CommentedFile) -> Self {
        Self {
            comment: Patch::Set(commented.comment),
            ..Self::default()
        }
    }
}

impl From<ShareUpdate> for FilePatch {
    fn from(update: ShareUpdate) -> Self {
        Self {
            share: Patch::Set(update.share),
            ..Self::default()
        }
    }
}
