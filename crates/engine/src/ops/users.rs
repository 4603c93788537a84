use chrono::Utc;
use sea_orm::{QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User,
    auth::INVALID_TOKEN,
    users::{self, normalize_email},
    validation::validate_registration,
};

use super::Engine;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// A freshly issued bearer token and the user it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Engine {
    /// Register a new user and log them in.
    ///
    /// Steps run in order: validate, check the email is free, hash the
    /// password, persist, issue a token.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ResultEngine<Session> {
        let input = validate_registration(name, email, password)?;
        let email = normalize_email(input.email);

        if self.user_by_email(&email).await?.is_some() {
            return Err(EngineError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = self.tokens.hash_password(input.password).await?;

        let id = Uuid::new_v4();
        let model = users::ActiveModel::new_user(
            id,
            input.name.to_string(),
            email,
            password_hash,
            Utc::now(),
        );
        // A concurrent registration can still win the race on the unique
        // email index; that surfaces as `DuplicateKey`.
        let model = model
            .insert(&self.database)
            .await
            .map_err(EngineError::from_write)?;
        let user = User::try_from(model)?;

        tracing::info!(user_id = %user.id, "user registered");
        let token = self.tokens.issue(user.id)?;
        Ok(Session { token, user })
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown email and wrong password fail with the same message.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(EngineError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let Some(model) = self.user_by_email(&normalize_email(email)).await? else {
            return Err(EngineError::Auth(INVALID_CREDENTIALS.to_string()));
        };

        if !self
            .tokens
            .verify_password(password, &model.password_hash)
            .await?
        {
            return Err(EngineError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        let user = User::try_from(model)?;
        let token = self.tokens.issue(user.id)?;
        Ok(Session { token, user })
    }

    /// Resolve a bearer token to the user id it was issued for.
    ///
    /// Fails with `Auth` when the token is malformed, expired, badly signed
    /// or names a user that is not stored.
    pub async fn verify(&self, token: &str) -> ResultEngine<Uuid> {
        let token = token.trim();
        if token.is_empty() {
            return Err(EngineError::Auth(INVALID_TOKEN.to_string()));
        }

        let user_id = self.tokens.decode(token)?;
        let exists = users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .is_some();
        if !exists {
            tracing::warn!(%user_id, "token for unknown user");
            return Err(EngineError::Auth(INVALID_TOKEN.to_string()));
        }

        Ok(user_id)
    }

    async fn user_by_email(&self, email: &str) -> ResultEngine<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?)
    }
}
