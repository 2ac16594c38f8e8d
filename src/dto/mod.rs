pub mod application_dto;
pub mod project_dto;
pub mod review_dto;
pub mod user_dto;
