pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod utils;

use std::sync::Arc;

use config::Config;
use db::db::DBClient;
use service::{
    chat_service::ChatService, engagement::EngagementService, projection::ProjectionService,
    review_service::ReviewService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub engagement_service: Arc<EngagementService<DBClient>>,
    pub chat_service: Arc<ChatService<DBClient>>,
    pub review_service: Arc<ReviewService<DBClient>>,
    pub projection_service: Arc<ProjectionService<DBClient>>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let engagement_service = Arc::new(EngagementService::new(db_client_arc.clone()));
        let chat_service = Arc::new(ChatService::new(db_client_arc.clone()));
        let review_service = Arc::new(ReviewService::new(db_client_arc.clone()));
        let projection_service = Arc::new(ProjectionService::new(
            db_client_arc.clone(),
            config.projection_refresh_secs,
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            engagement_service,
            chat_service,
            review_service,
            projection_service,
        }
    }
}
