pub mod outbox_drain_job;

pub use outbox_drain_job::{DrainRunStats, OutboxDrainJob};
