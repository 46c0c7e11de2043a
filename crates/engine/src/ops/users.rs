use sea_orm::{ActiveValue, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, User, users};

use super::{Engine, normalize_required_name};

impl Engine {
    /// Registers a user and returns its id.
    ///
    /// Emails are unique across the store; credentials and session handling
    /// live outside the engine.
    pub async fn new_user(&self, email: &str, name: &str) -> ResultEngine<Uuid> {
        let email = normalize_email(email)?;
        let name = normalize_required_name(name, "user")?;

        if users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(email));
        }

        let id = Uuid::new_v4();
        let active = users::ActiveModel {
            id: ActiveValue::Set(id),
            email: ActiveValue::Set(email),
            name: ActiveValue::Set(name),
        };
        active.insert(&self.database).await?;
        Ok(id)
    }

    /// Return a [`User`].
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let valid = trimmed.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });
    if !valid {
        return Err(EngineError::InvalidName(format!(
            "invalid email: {trimmed}"
        )));
    }
    Ok(trimmed.to_string())
}
