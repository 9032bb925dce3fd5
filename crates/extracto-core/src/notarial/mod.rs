//! Notarial act extraction.
//!
//! Three parsers cover the layouts seen in notarial extracts: labelled flat
//! text ([`LinearTextParser`]), several extracts or compound titles in one
//! document ([`SegmentingParser`]) and coordinate tables
//! ([`SpatialTableParser`]). [`ClassificationOrchestrator`] picks among them;
//! [`HybridAggregator`] cross-checks the result with an external provider.

pub mod hybrid;
mod linear;
mod orchestrator;
pub mod provider;
pub mod rules;
mod segmenting;
mod spatial;

pub use hybrid::{
    bucket_entities, dedupe_entities, jaccard, EntityBucket, HybridAggregator, HybridOutcome,
    MergedAct, SideOutcome, EXTERNAL_SOURCE, LOCAL_SOURCE,
};
pub use linear::{LinearTextParser, LINEAR_CONFIDENCE};
pub use orchestrator::{ClassificationOrchestrator, DocumentAnalysis, Strategy, StrategyResult};
#[cfg(feature = "http")]
pub use provider::HttpExtractionProvider;
pub use provider::{ExtractionProvider, ProviderAct, ProviderDocument, ProviderResponse};
pub use segmenting::{split_compound_title, SegmentingParser, SEGMENTED_CONFIDENCE};
pub use spatial::{SpatialTableParser, TableSection, TableSectionKind, SPATIAL_CONFIDENCE};
