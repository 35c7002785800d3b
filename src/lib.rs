pub mod cluster;
pub mod config;
pub mod features;
pub mod insights;
pub mod lexicon;
pub mod metrics;
pub mod model;
pub mod models;
pub mod orchestrator;
pub mod scoring;
pub mod store;
pub mod themes;
pub mod vectorize;

pub use config::AnalysisConfig;
pub use models::{AnalysisResult, RawItem, SentimentRecord, Theme};
pub use orchestrator::run_analysis;
