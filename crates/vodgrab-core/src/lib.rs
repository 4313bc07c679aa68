pub mod config;
pub mod logging;

pub mod downloader;
pub mod mapping;
pub mod normalize;
pub mod playlist;
pub mod progress;
pub mod scheduler;
pub mod source;
pub mod url_model;
