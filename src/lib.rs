pub mod config;
pub mod models;
pub mod ordering;
pub mod render;
pub mod scoring;
pub mod store;
pub mod update;
