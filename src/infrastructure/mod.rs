pub mod broker;
pub mod cache;
pub mod database;
pub mod jobs;
