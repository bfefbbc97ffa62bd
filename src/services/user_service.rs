use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::Utc;
use tracing::info;

use crate::{
    config::Config,
    error::{AppError, StoreError},
    models::user::{AuthResponse, LoginRequest, RegisterRequest, Role, SiteStats, User},
    store::{ScoreStore, UserStore},
    utils::{generate_jwt, hash_password, verify_password},
};

pub struct UserService {
    users: Arc<dyn UserStore>,
    scores: Arc<dyn ScoreStore>,
    config: Arc<Config>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, scores: Arc<dyn ScoreStore>, config: Arc<Config>) -> Self {
        Self {
            users,
            scores,
            config,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_lowercase();

        if self.users.username_or_email_taken(&username, &email).await? {
            return Err(AppError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }

        let role = if self.config.is_admin_email(&email) {
            Role::Admin
        } else {
            Role::User
        };
        let now = Utc::now();
        let user = User {
            id: None,
            username,
            email,
            password_hash: hash_password(&req.password)?,
            role,
            created_at: now,
            updated_at: now,
        };

        let user = match self.users.insert_user(user).await {
            Ok(user) => user,
            // lost a race with a concurrent registration
            Err(StoreError::Duplicate(_)) => {
                return Err(AppError::Conflict(
                    "User with this email or username already exists".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        info!(username = %user.username, role = %user.role, "User registered");
        self.issue_token(user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let email = req.email.trim().to_lowercase();
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = self.users.find_user_by_email(&email).await?.ok_or_else(invalid)?;
        if !verify_password(&user.password_hash, &req.password) {
            return Err(invalid());
        }

        info!(username = %user.username, "User logged in");
        self.issue_token(user)
    }

    pub async fn get(&self, user_id: ObjectId) -> Result<User, AppError> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn stats(&self) -> Result<SiteStats, AppError> {
        Ok(SiteStats {
            total_users: self.users.count_users().await?,
            total_records: self.scores.count().await?,
        })
    }

    fn issue_token(&self, user: User) -> Result<AuthResponse, AppError> {
        let user_id = user
            .id
            .ok_or_else(|| AppError::Internal("user record missing id".to_string()))?;
        let token = generate_jwt(
            &user_id.to_hex(),
            &user.role.to_string(),
            &self.config.jwt_secret,
            self.config.jwt_expires_hours,
        )?;

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }
}
