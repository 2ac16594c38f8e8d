pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    application_service::ApplicationService, moderation_service::ModerationService,
    project_service::ProjectService, review_service::ReviewService,
    storage_service::StorageService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub storage: StorageService,
    pub user_service: UserService,
    pub project_service: ProjectService,
    pub application_service: ApplicationService,
    pub review_service: ReviewService,
    pub moderation_service: ModerationService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let storage = StorageService::new(config.uploads_dir.clone());

        let user_service = UserService::new(pool.clone());
        let project_service = ProjectService::new(pool.clone(), storage.clone());
        let application_service =
            ApplicationService::new(pool.clone(), project_service.clone(), storage.clone());
        let review_service = ReviewService::new(
            pool.clone(),
            project_service.clone(),
            application_service.clone(),
            user_service.clone(),
        );
        let moderation_service =
            ModerationService::new(pool.clone(), user_service.clone(), storage.clone());

        Self {
            pool,
            config: Arc::new(config),
            storage,
            user_service,
            project_service,
            application_service,
            review_service,
            moderation_service,
        }
    }
}
