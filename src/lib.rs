pub mod assets;
pub mod config;
pub mod database;
pub mod errors;
pub mod lookup;
pub mod models;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod utils;
pub mod wizard;
