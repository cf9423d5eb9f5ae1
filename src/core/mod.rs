// src/core/mod.rs

// The reconnaissance engine: discovery producers, resolution and enrichment
// stages, and the pipeline that sequences them behind the analysis cache.
pub mod cache;
pub mod command;
pub mod config;
pub mod dns;
pub mod enrich;
pub mod enumerate;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod pool;
pub mod probe;
pub mod proxy;
pub mod whois;

pub use cache::AnalysisCache;
pub use config::AnalyzeOptions;
pub use error::EngineError;
pub use models::AnalysisReport;
pub use pipeline::ReconPipeline;
