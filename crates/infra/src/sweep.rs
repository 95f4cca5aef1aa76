//! Deactivation sweep: periodically close postings past their deadline.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::stores::JobStore;

/// Handle to the running sweep task.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: watch::Sender<bool>,
    join: tokio::task::JoinHandle<()>,
}

impl SweepHandle {
    /// Signal shutdown; the task exits at its next loop turn.
    pub fn shutdown(self) {
        let _ = self.shutdown.send(true);
        self.join.abort();
    }
}

/// Spawn the periodic sweep on the current runtime.
///
/// Runs once immediately, then every `interval`. Each run is one bulk
/// update; reruns with nothing newly expired are no-ops, so the cadence is
/// safe to tune freely.
pub fn spawn_deactivation_sweep(store: Arc<dyn JobStore>, interval: Duration) -> SweepHandle {
    let (tx, mut rx) = watch::channel(false);

    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        info!(interval_secs = interval.as_secs(), "deactivation sweep started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match store.deactivate_expired(Utc::now()).await {
                        Ok(0) => debug!("deactivation sweep: nothing expired"),
                        Ok(closed) => info!(closed, "deactivation sweep closed expired jobs"),
                        Err(error) => warn!(%error, "deactivation sweep failed"),
                    }
                }
                _ = rx.changed() => break,
            }
        }

        info!("deactivation sweep stopped");
    });

    SweepHandle { shutdown: tx, join }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use talentbridge_core::UserId;
    use talentbridge_jobs::{ExperienceLevel, Job, JobType, NewJob, RemoteStatus};

    use crate::stores::InMemoryStore;

    fn expired_posting() -> Job {
        Job::post(
            NewJob {
                employer_id: UserId::new(),
                title: "Old Role".to_string(),
                company_name: Some("Acme".to_string()),
                description: "Closed soon.".to_string(),
                requirements: "None".to_string(),
                location: "Anywhere".to_string(),
                salary: None,
                salary_range: None,
                job_type: JobType::Contract,
                remote_status: RemoteStatus::Remote,
                experience_level: ExperienceLevel::Junior,
                deadline: Some(Utc::now() - ChronoDuration::hours(1)),
            },
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sweep_task_closes_expired_postings() {
        let store = Arc::new(InMemoryStore::new());
        let job = expired_posting();
        JobStore::insert(&*store, job.clone()).await.unwrap();

        let handle = spawn_deactivation_sweep(
            store.clone() as Arc<dyn JobStore>,
            Duration::from_millis(10),
        );

        for _ in 0..100 {
            let current = JobStore::get(&*store, job.id).await.unwrap().unwrap();
            if !current.is_active {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.shutdown();

        let current = JobStore::get(&*store, job.id).await.unwrap().unwrap();
        assert!(!current.is_active);
    }
}
