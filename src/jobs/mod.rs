mod backfill;
mod ingest;
mod scheduler;

pub use backfill::Backfiller;
pub use ingest::Ingestor;
pub use scheduler::{DailyTrigger, Job, Scheduler};
