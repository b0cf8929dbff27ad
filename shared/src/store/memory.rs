use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{StoreError, UserStore};
use crate::models::{demo_users, User};

/// Process-local user store. Records are lost on restart.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub fn with_demo_users() -> Self {
        Self::with_users(demo_users())
    }
}

fn email_taken(users: &HashMap<String, User>, email: &str, except_id: &str) -> bool {
    users
        .values()
        .any(|u| u.id != except_id && u.email.eq_ignore_ascii_case(email))
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {} not found", id)))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("User {} already exists", user.id)));
        }
        if email_taken(&users, &user.email, &user.id) {
            return Err(StoreError::Conflict(format!(
                "E-mail {} is already registered",
                user.email
            )));
        }
        debug!("Creating user id={}", user.id);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound(format!("User {} not found", user.id)));
        }
        if email_taken(&users, &user.email, &user.id) {
            return Err(StoreError::Conflict(format!(
                "E-mail {} is already registered",
                user.email
            )));
        }
        debug!("Updating user id={}", user.id);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("User {} not found", id)))
    }
}
