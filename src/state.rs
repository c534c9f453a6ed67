//! Application state management.

use crate::config::Config;
use crate::models::User;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Application state shared across all handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// Users keyed by id.
    pub users: Arc<DashMap<Uuid, User>>,
    /// Token accepted on protected routes.
    pub auth_token: Option<String>,
}

impl AppState {
    /// Creates an empty state that accepts any bearer token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates state from configuration, seeding configured users.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let state = Self {
            users: Arc::new(DashMap::new()),
            auth_token: config.auth.token.clone(),
        };

        for seed in &config.users {
            state.insert_user(seed.name.trim());
        }
        info!(users = state.users.len(), "Seeded user store");

        state
    }

    /// Creates a user and returns it.
    pub fn insert_user(&self, name: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        user
    }

    /// All users ordered by creation time, then name.
    #[must_use]
    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        users
    }

    /// Checks a presented bearer token.
    #[must_use]
    pub fn accepts_token(&self, presented: &str) -> bool {
        match &self.auth_token {
            Some(expected) => presented == expected,
            None => !presented.is_empty(),
        }
    }
}
