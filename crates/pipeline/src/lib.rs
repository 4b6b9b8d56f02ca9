//! Attribution pipeline stages.

pub mod categorizer;
pub mod collector;
pub mod enrichment;
pub mod export;
pub mod resolver;
pub mod runner;
pub mod validator;

pub use categorizer::{categorize_records, CategorizerOutput};
pub use collector::{CollectorOutput, CollectorStats, FormRecordCollector};
pub use enrichment::{AdSetEnricher, EnricherOutput, EnricherStats};
pub use export::{export_campaign, ExportedFiles};
pub use resolver::{resolve, ResolverOutput, ResolverStats};
pub use runner::{AttributionPipeline, PipelineConfig, PipelineOutput, StageStats};
pub use validator::{validate, validate_file, ValidationReport, ValidationStatus};
