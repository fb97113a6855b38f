// Application Layer - Use Cases and Business Logic

pub mod address;
pub mod coordinator;
pub mod enrichment;
pub mod pipeline;
pub mod transport;
pub mod worker;

// Re-exports
pub use address::build_complete_address;
pub use coordinator::{JobCoordinator, JobCounts, SubmitOutcome, SubmitRequest};
pub use enrichment::EnrichmentService;
pub use pipeline::ScrapePipeline;
pub use transport::{BulkRecompute, RecomputeEntry, RecomputeRequest, Recomputed, TransportService};
pub use worker::{
    shutdown_channel, unit_channel, ShutdownSender, ShutdownToken, Supervisor, UnitOutcome,
    UnitReport, UnitSpawner,
};
