pub mod application;
pub mod project;
pub mod review;
pub mod user;
