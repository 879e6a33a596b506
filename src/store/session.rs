//! Signed-in user, tokens and permission codes.

use crate::error::AdminError;
use crate::store::{PersistedStore, StorageBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const AUTH_STORAGE_KEY: &str = "auth-storage";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Guest,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Blocked,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    /// e.g. "dict:delete"
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub action: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

pub struct SessionStore {
    inner: PersistedStore<Session>,
}

impl SessionStore {
    pub fn open(backend: Arc<dyn StorageBackend>) -> Result<Self, AdminError> {
        Ok(SessionStore {
            inner: PersistedStore::open(backend, AUTH_STORAGE_KEY)?,
        })
    }

    pub fn snapshot(&self) -> Session {
        self.inner.get()
    }

    pub fn sign_in(&self, user: User, tokens: AuthTokens, permissions: Vec<Permission>) -> Result<(), AdminError> {
        tracing::info!(user = %user.username, "signed in");
        self.inner.update(|s| {
            s.user = Some(user);
            s.token = Some(tokens.access_token);
            s.refresh_token = Some(tokens.refresh_token);
            s.permissions = permissions;
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.read(|s| s.token.clone().filter(|t| !t.is_empty()))
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read(|s| s.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.read(|s| s.user.clone())
    }

    /// Apply a change to the signed-in user; no-op when nobody is signed in.
    pub fn update_user(&self, f: impl FnOnce(&mut User)) -> Result<(), AdminError> {
        self.inner.update(|s| {
            if let Some(user) = s.user.as_mut() {
                f(user);
            }
        })
    }

    pub fn set_permissions(&self, permissions: Vec<Permission>) -> Result<(), AdminError> {
        self.inner.update(|s| s.permissions = permissions)
    }

    /// Drop user, tokens and permissions, in memory and in storage.
    pub fn clear(&self) -> Result<(), AdminError> {
        tracing::info!("session cleared");
        self.inner.reset()
    }

    pub fn flush(&self) -> Result<(), AdminError> {
        self.inner.flush()
    }

    pub fn permission_codes(&self) -> Vec<String> {
        self.inner.read(|s| s.permissions.iter().map(|p| p.code.clone()).collect())
    }

    /// False when nobody is signed in, whatever permissions are cached.
    pub fn has_permission(&self, code: &str) -> bool {
        self.inner
            .read(|s| s.user.is_some() && s.permissions.iter().any(|p| p.code == code))
    }

    pub fn has_any_permission(&self, codes: &[&str]) -> bool {
        codes.iter().any(|c| self.has_permission(c))
    }

    pub fn has_all_permissions(&self, codes: &[&str]) -> bool {
        codes.iter().all(|c| self.has_permission(c))
    }

    /// Routes without requirements are open to everyone; otherwise any listed code grants access.
    pub fn can_access(&self, required: &[&str]) -> bool {
        required.is_empty() || self.has_any_permission(required)
    }
}
