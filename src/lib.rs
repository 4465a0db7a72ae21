mod labels;
mod model_fetch;
mod model_service;
mod ort_service;
mod pipeline;
mod preprocess;
mod publisher;
mod records;
mod source;

pub mod app;
pub mod config;
pub mod error;

pub use app::start_app;
