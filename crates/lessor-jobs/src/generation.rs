//! Renewal generation job
//!
//! Walks every active auto-renew lease and creates its draft renewal once
//! the lease enters the generation window: at most `threshold` days before
//! expiry, at least `threshold - tolerance`. Leases with an open renewal are
//! not re-generated; if that renewal is auto-approvable and its document has
//! since been rendered, the job promotes it to ready-for-signature instead.
//!
//! Candidates are processed one at a time; a failing lease is logged,
//! reported to its manager or creator, and never aborts the batch.

use crate::config::SchedulerConfig;
use crate::report::JobReport;
use chrono::{DateTime, Utc};
use lessor_core::{LeaseService, LeaseStore, NotificationDispatcher};
use lessor_domain::{Actor, ApprovalAction, ApprovalStatus, Lease, LeaseError, LeaseStatus};
use std::sync::Arc;

const JOB_NAME: &str = "renewal-generation";

enum Outcome {
    Created,
    Skipped(&'static str),
}

/// Scheduled creation of draft renewals for expiring leases
pub struct GenerationJob {
    store: Arc<dyn LeaseStore>,
    service: Arc<LeaseService>,
    notifications: Arc<dyn NotificationDispatcher>,
    config: SchedulerConfig,
}

impl GenerationJob {
    pub fn new(
        store: Arc<dyn LeaseStore>,
        service: Arc<LeaseService>,
        notifications: Arc<dyn NotificationDispatcher>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            service,
            notifications,
            config,
        }
    }

    /// Run one pass over the current candidates.
    ///
    /// # Errors
    /// Only the candidate listing itself can fail the run; per-lease errors
    /// are absorbed into the report.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<JobReport, LeaseError> {
        let candidates = self.store.list_renewal_candidates().await?;
        let mut report = JobReport::new(JOB_NAME);

        for lease in candidates {
            report.processed += 1;
            match self.process(&lease, now).await {
                Ok(Outcome::Created) => report.succeeded += 1,
                Ok(Outcome::Skipped(reason)) => {
                    tracing::debug!(luid = %lease.luid, reason, "generation skipped");
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(luid = %lease.luid, error = %e, "renewal generation failed");
                    self.report_failure(&lease, &e).await;
                    report.record_failure(lease.luid.clone(), e.to_string());
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            created = report.succeeded,
            skipped = report.skipped,
            failed = report.failed,
            "renewal generation run complete"
        );
        Ok(report)
    }

    async fn process(&self, lease: &Lease, now: DateTime<Utc>) -> Result<Outcome, LeaseError> {
        let Some(threshold) = lease.renewal_options.days_before_expiry_to_generate_renewal
        else {
            return Ok(Outcome::Skipped("no generation threshold configured"));
        };

        let days_until_expiry = (lease.duration.end_date - now.date_naive()).num_days();
        if days_until_expiry > threshold
            || days_until_expiry < threshold - self.config.generation_tolerance_days
        {
            return Ok(Outcome::Skipped("outside generation window"));
        }

        if let Some(existing) = self.store.find_open_renewal_of(lease.id).await? {
            // Document generation may have caught up since the renewal was
            // created; finish the promotion it was waiting on.
            self.maybe_promote(existing, &lease.renewal_options, now)
                .await?;
            return Ok(Outcome::Skipped("open renewal already exists"));
        }

        let renewal = self
            .service
            .renew_lease_scheduled(lease.client_id, &lease.luid, now)
            .await?;
        self.maybe_promote(renewal, &lease.renewal_options, now).await?;
        Ok(Outcome::Created)
    }

    /// Move an auto-approvable draft renewal with a rendered document to
    /// ready-for-signature, leaving an audit entry.
    async fn maybe_promote(
        &self,
        mut renewal: Lease,
        options: &lessor_domain::RenewalOptions,
        now: DateTime<Utc>,
    ) -> Result<(), LeaseError> {
        if options.require_approval
            || renewal.status != LeaseStatus::DraftRenewal
            || renewal.document.is_none()
        {
            return Ok(());
        }
        renewal.status = LeaseStatus::ReadyForSignature;
        renewal.approval_status = ApprovalStatus::Approved;
        renewal.record_approval(
            ApprovalAction::AutoApproved,
            Actor::System,
            Some("auto-approved by renewal generation".into()),
            now,
        );
        renewal.touch(Actor::System, "auto_approve_renewal", now);
        let updated = self.store.update(renewal).await?;
        tracing::info!(luid = %updated.luid, "renewal promoted to ready for signature");
        Ok(())
    }

    async fn report_failure(&self, lease: &Lease, error: &LeaseError) {
        let recipient = lease
            .property
            .manager_user_id
            .or_else(|| lease.created_by.user_id());
        let result = match recipient {
            Some(recipient) => {
                self.notifications
                    .create_notification(
                        recipient,
                        "Renewal generation failed",
                        &format!("Automatic renewal of lease {} failed: {error}", lease.luid),
                    )
                    .await
            }
            None => {
                self.notifications
                    .notify_system_error(&format!("renewal generation for {}", lease.luid), error)
                    .await
            }
        };
        if let Err(e) = result {
            tracing::warn!(luid = %lease.luid, error = %e, "failure notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, TimeZone};
    use lessor_core::CoreConfig;
    use lessor_domain::GeneratedDocument;
    use lessor_test_utils::fixtures::{auto_renew_lease, date};
    use lessor_test_utils::{
        MemoryLeaseStore, RecordingDocumentQueue, RecordingEventBus, RecordingNotifier,
        StaticDirectory,
    };
    use pretty_assertions::assert_eq;

    fn run_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap()
    }

    fn job(store: Arc<MemoryLeaseStore>) -> GenerationJob {
        let store: Arc<dyn LeaseStore> = store;
        let notifications = Arc::new(RecordingNotifier::new());
        let service = Arc::new(LeaseService::new(
            Arc::clone(&store),
            notifications.clone(),
            Arc::new(RecordingEventBus::new()),
            Arc::new(RecordingDocumentQueue::new()),
            Arc::new(StaticDirectory::empty()),
            CoreConfig::new(),
        ));
        GenerationJob::new(
            store,
            service,
            notifications,
            SchedulerConfig::new(lessor_core::SenderInfo {
                name: "Leasing Office".into(),
                email: "leasing@example.com".into(),
            }),
        )
    }

    fn renewal_count(store: &MemoryLeaseStore) -> usize {
        store.count_where(|l| l.previous_lease_id.is_some())
    }

    #[tokio::test]
    async fn generation_window_has_one_day_tolerance() {
        // threshold 30: 31 days out skips, 30 and 29 create, 28 skips
        for (days_out, expect_created) in [(31, false), (30, true), (29, true), (28, false)] {
            let store = Arc::new(MemoryLeaseStore::new());
            let now = run_clock();
            let end = now.date_naive().checked_add_days(Days::new(days_out)).unwrap();
            store.seed(auto_renew_lease(end, 30));

            let report = job(Arc::clone(&store)).run(now).await.unwrap();

            assert_eq!(report.processed, 1, "{days_out} days out");
            assert_eq!(
                renewal_count(&store),
                usize::from(expect_created),
                "{days_out} days out"
            );
            assert_eq!(report.succeeded, usize::from(expect_created));
        }
    }

    #[tokio::test]
    async fn two_runs_create_exactly_one_renewal() {
        let store = Arc::new(MemoryLeaseStore::new());
        let now = run_clock();
        let end = now.date_naive().checked_add_days(Days::new(30)).unwrap();
        store.seed(auto_renew_lease(end, 30));
        let job = job(Arc::clone(&store));

        let first = job.run(now).await.unwrap();
        let second = job.run(now).await.unwrap();

        assert_eq!(first.succeeded, 1);
        assert_eq!(second.succeeded, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(renewal_count(&store), 1);
    }

    #[tokio::test]
    async fn fresh_renewal_without_document_stays_draft() {
        let store = Arc::new(MemoryLeaseStore::new());
        let now = run_clock();
        let end = now.date_naive().checked_add_days(Days::new(30)).unwrap();
        store.seed(auto_renew_lease(end, 30));

        job(Arc::clone(&store)).run(now).await.unwrap();

        let renewal = store
            .get_where(|l| l.previous_lease_id.is_some())
            .expect("renewal created");
        assert_eq!(renewal.status, LeaseStatus::DraftRenewal);
    }

    #[tokio::test]
    async fn open_renewal_with_document_is_promoted_on_next_run() {
        let store = Arc::new(MemoryLeaseStore::new());
        let now = run_clock();
        let end = now.date_naive().checked_add_days(Days::new(30)).unwrap();
        store.seed(auto_renew_lease(end, 30));
        let job = job(Arc::clone(&store));

        job.run(now).await.unwrap();
        let mut renewal = store
            .get_where(|l| l.previous_lease_id.is_some())
            .expect("renewal created");
        renewal.document = Some(GeneratedDocument {
            file_key: "leases/renewal.pdf".into(),
            template: lessor_domain::DocumentTemplate::RenewalLease,
            generated_at: now,
        });
        store.seed(renewal.clone());

        let report = job.run(now).await.unwrap();

        assert_eq!(report.skipped, 1);
        let promoted = store.get(renewal.id).unwrap();
        assert_eq!(promoted.status, LeaseStatus::ReadyForSignature);
        assert_eq!(promoted.approval_status, ApprovalStatus::Approved);
        assert!(promoted
            .approval_details
            .iter()
            .any(|e| e.action == ApprovalAction::AutoApproved));
    }

    #[tokio::test]
    async fn leases_outside_candidate_shape_are_untouched() {
        let store = Arc::new(MemoryLeaseStore::new());
        let now = run_clock();
        let mut lease = auto_renew_lease(date(2025, 1, 31), 30);
        lease.renewal_options.auto_renew = false;
        store.seed(lease);

        let report = job(Arc::clone(&store)).run(now).await.unwrap();

        assert_eq!(report.processed, 0);
        assert_eq!(renewal_count(&store), 0);
    }
}
