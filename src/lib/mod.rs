pub mod constants;
pub mod error;
pub mod models;
pub mod modules;
pub mod retrieval;
pub mod version;
