use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Utc};
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};

/// How long after its trigger time a job may still start.
const FIRE_WINDOW_MINUTES: i64 = 5;
const TICK: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    /// Run once, returning how many items were processed.
    async fn run(&self) -> Result<usize>;
}

/// Fires once a day at a fixed UTC time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    at: NaiveTime,
}

impl DailyTrigger {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    /// Parse `HH:MM`.
    pub fn parse(raw: &str) -> Result<Self> {
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .map(Self::new)
            .map_err(|e| AppError::Config(format!("invalid schedule time '{}': {}", raw, e)))
    }

    /// Due inside `[at, at + window)` unless it already fired in this window.
    pub fn is_due(&self, now: NaiveDateTime, last_fired: Option<NaiveDateTime>) -> bool {
        let window = TimeDelta::minutes(FIRE_WINDOW_MINUTES);

        let mut since_trigger = now.time() - self.at;
        if since_trigger < TimeDelta::zero() {
            since_trigger = since_trigger + TimeDelta::days(1);
        }
        if since_trigger >= window {
            return false;
        }

        match last_fired {
            Some(prev) => now - prev >= window,
            None => true,
        }
    }
}

struct ScheduledJob {
    trigger: DailyTrigger,
    job: Arc<dyn Job>,
    last_fired: Option<NaiveDateTime>,
}

/// Runs daily jobs from one background task, one job at a time.
pub struct Scheduler {
    jobs: Vec<ScheduledJob>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn add(&mut self, trigger: DailyTrigger, job: Arc<dyn Job>) {
        tracing::info!("Scheduled {} daily at {} UTC", job.name(), trigger.at.format("%H:%M"));
        self.jobs.push(ScheduledJob {
            trigger,
            job,
            last_fired: None,
        });
    }

    /// Run every job due at `now`, in registration order. Returns how many ran.
    pub async fn run_pending(&mut self, now: NaiveDateTime) -> usize {
        let mut ran = 0;
        for scheduled in &mut self.jobs {
            if !scheduled.trigger.is_due(now, scheduled.last_fired) {
                continue;
            }
            scheduled.last_fired = Some(now);
            ran += 1;

            let name = scheduled.job.name().to_string();
            tracing::info!(job = %name, "Starting scheduled job");
            match scheduled.job.run().await {
                Ok(count) => tracing::info!(job = %name, "Job finished, {} items", count),
                Err(e) => tracing::error!(job = %name, "Job failed: {}", e),
            }
        }
        ran
    }

    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            loop {
                interval.tick().await;
                self.run_pending(Utc::now().naive_utc()).await;
            }
        })
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
