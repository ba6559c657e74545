pub mod article;
pub mod job;
