pub mod apis;
pub mod category;
pub mod config;
pub mod constants;
pub mod error;
pub mod geocode;
pub mod logging;
pub mod pipeline;
pub mod transform;
pub mod types;
