//! Session stub.
//!
//! There is no authentication yet: every request acts as the user configured
//! under `[session]`. The role always comes from the stored user record.

use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::models::{Role, Teacher, User};
use crate::store::{parse_id, Store};

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
}

impl From<&SessionConfig> for Session {
    fn from(config: &SessionConfig) -> Self {
        Self {
            user_id: config.user_id.clone(),
        }
    }
}

impl Session {
    pub async fn current_user(&self, store: &dyn Store) -> Result<User, ApiError> {
        let user_id = parse_id(&self.user_id)?;
        let user = store.find_user_by_id(user_id).await?;
        user.ok_or(ApiError::NotFound("User not found"))
    }

    pub async fn require_student(&self, store: &dyn Store) -> Result<User, ApiError> {
        let user = self.current_user(store).await?;
        match user.role {
            Role::Student => Ok(user),
            Role::Teacher => Err(ApiError::Forbidden("Not a student")),
        }
    }

    /// Resolves the teacher record behind this session.
    pub async fn current_teacher(&self, store: &dyn Store) -> Result<Teacher, ApiError> {
        let user = self.current_user(store).await?;
        if user.role != Role::Teacher {
            return Err(ApiError::Forbidden("Not a teacher"));
        }

        let teacher = store.find_teacher_by_user_id(user.id).await?;
        teacher.ok_or(ApiError::NotFound("Teacher not found"))
    }
}
