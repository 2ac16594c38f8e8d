pub mod application_service;
pub mod moderation_service;
pub mod policy;
pub mod project_service;
pub mod review_service;
pub mod storage_service;
pub mod user_service;
