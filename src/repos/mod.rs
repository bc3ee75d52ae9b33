pub mod class_repo;
pub mod document_repo;
pub mod error;
pub mod user_repo;
