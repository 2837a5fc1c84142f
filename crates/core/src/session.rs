use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::project::ProjectId;
use crate::domain::user::{RoleCode, UserId};
use crate::workflow::rules::Actor;

/// Cached identity snapshot, kept so the signed-in user does not have to be
/// refetched on every start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub user_id: UserId,
    pub full_name: String,
    pub role_code: RoleCode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SessionData {
    token: Option<String>,
    favorite_projects: BTreeSet<String>,
    profile: Option<UserSnapshot>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not access session store `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("could not parse session store `{path}`: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// The single process-wide home for client-persisted state: the bearer
/// token, the favorite-project set, and the user profile snapshot. Replaces
/// scattered ad-hoc reads of per-key local storage; consumers go through the
/// accessors and never touch the file. Single-process model, no file locking.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    data: RwLock<SessionData>,
}

impl SessionStore {
    /// Opens the store at `path`. A missing file is an empty session, not an
    /// error; a corrupt file is surfaced rather than silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|source| SessionError::Parse { path: path.clone(), source })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => SessionData::default(),
            Err(source) => return Err(SessionError::Io { path, source }),
        };

        Ok(Self { path, data: RwLock::new(data) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> Option<SecretString> {
        self.read().token.clone().map(SecretString::from)
    }

    pub fn has_token(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn set_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        self.mutate(|data| data.token = Some(token.into()))
    }

    pub fn clear_token(&self) -> Result<(), SessionError> {
        self.mutate(|data| data.token = None)
    }

    pub fn favorites(&self) -> Vec<ProjectId> {
        self.read().favorite_projects.iter().cloned().map(ProjectId).collect()
    }

    /// Returns false when the project was already a favorite.
    pub fn add_favorite(&self, project_id: &ProjectId) -> Result<bool, SessionError> {
        let mut inserted = false;
        self.mutate(|data| inserted = data.favorite_projects.insert(project_id.0.clone()))?;
        Ok(inserted)
    }

    /// Returns false when the project was not a favorite.
    pub fn remove_favorite(&self, project_id: &ProjectId) -> Result<bool, SessionError> {
        let mut removed = false;
        self.mutate(|data| removed = data.favorite_projects.remove(&project_id.0))?;
        Ok(removed)
    }

    pub fn profile(&self) -> Option<UserSnapshot> {
        self.read().profile.clone()
    }

    pub fn set_profile(&self, profile: UserSnapshot) -> Result<(), SessionError> {
        self.mutate(|data| data.profile = Some(profile))
    }

    /// The workflow actor for the signed-in user, if identity is cached.
    pub fn actor(&self) -> Option<Actor> {
        self.read()
            .profile
            .as_ref()
            .map(|profile| Actor { user_id: profile.user_id.clone(), role: profile.role_code })
    }

    /// Drops the token and profile but keeps favorites.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.mutate(|data| {
            data.token = None;
            data.profile = None;
        })
    }

    fn read(&self) -> SessionData {
        match self.data.read() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut SessionData)) -> Result<(), SessionError> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &SessionData) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|source| SessionError::Io { path: self.path.clone(), source })?;
            }
        }

        let raw = serde_json::to_string_pretty(data)
            .map_err(|source| SessionError::Parse { path: self.path.clone(), source })?;
        fs::write(&self.path, raw)
            .map_err(|source| SessionError::Io { path: self.path.clone(), source })
    }
}
