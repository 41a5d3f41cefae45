pub mod client;
pub mod config;
pub mod downloader;
pub mod error;
pub mod logging;
pub mod progress;
pub mod probe;
pub mod scheduler;
pub mod segmenter;
pub mod storage;
pub mod url_model;

pub use error::{CleanupWarning, DownloadError, FetchError, Stage};
