use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// 课程进度游标：当前级别 / 类别的序号，新词选取从这里开始向后走
    pub current_level: Option<u32>,
    pub current_category: Option<u32>,
    pub tutorial_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// Login-or-register: returns the existing user for this username or
    /// creates a fresh one. The boolean reports whether a user was created.
    ///
    /// Uses compare-and-swap on the username index so two concurrent first
    /// logins with the same name cannot both create a user.
    pub fn get_or_create_user(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<(User, bool), StoreError> {
        if let Some(existing) = self.get_user_by_username(username)? {
            return Ok((existing, false));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            current_level: None,
            current_category: None,
            tutorial_completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let index_key = keys::username_index_key(username);
        let cas_result = self
            .users
            .compare_and_swap(
                index_key.as_bytes(),
                None::<&[u8]>,
                Some(user.id.as_bytes().to_vec()),
            )
            .map_err(StoreError::Sled)?;

        if cas_result.is_err() {
            // Lost the race: another request created this username first.
            let existing = self
                .get_user_by_username(username)?
                .ok_or_else(|| StoreError::Conflict {
                    entity: "user".to_string(),
                    key: username.to_string(),
                })?;
            return Ok((existing, false));
        }

        let user_key = keys::user_key(&user.id);
        if let Err(e) = self.users.insert(user_key.as_bytes(), Self::serialize(&user)?) {
            let _ = self.users.remove(index_key.as_bytes());
            return Err(StoreError::Sled(e));
        }

        Ok((user, true))
    }

    pub fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let key = keys::user_key(user_id);
        match self.users.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let index_key = keys::username_index_key(username);
        let Some(user_id_raw) = self.users.get(index_key.as_bytes())? else {
            return Ok(None);
        };
        let user_id = match String::from_utf8(user_id_raw.to_vec()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid UTF-8 in username index");
                return Ok(None);
            }
        };
        self.get_user_by_id(&user_id)
    }

    pub fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let key = keys::user_key(&user.id);
        if self.users.get(key.as_bytes())?.is_none() {
            return Err(StoreError::NotFound {
                entity: "user".to_string(),
                key: user.id.clone(),
            });
        }
        self.users.insert(key.as_bytes(), Self::serialize(user)?)?;
        Ok(())
    }
}
