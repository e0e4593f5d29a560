pub mod config;
pub mod measure;
pub mod pose;
pub mod record;
pub mod session;
