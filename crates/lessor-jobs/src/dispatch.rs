//! Signature dispatch job
//!
//! Walks every approved, signature-ready renewal and sends it to the
//! e-signature provider once `target_send_date = original_end - days_before`
//! has arrived. Misconfigured renewals (no provider) and renewals whose
//! original lease expired past the grace period are marked failed on the
//! record itself so staff can review them; everything else waits for a
//! later run.

use crate::config::SchedulerConfig;
use crate::report::JobReport;
use chrono::{DateTime, Duration, Utc};
use lessor_core::{send_lease_for_signature, ESignatureGateway, LeaseStore, NotificationDispatcher};
use lessor_domain::{Actor, AutoSendInfo, Lease, LeaseError, SigningMethod};
use std::sync::Arc;

const JOB_NAME: &str = "renewal-dispatch";

enum Outcome {
    Sent,
    Skipped(&'static str),
    Failed(String),
}

/// Scheduled auto-send of approved renewals for e-signature
pub struct DispatchJob {
    store: Arc<dyn LeaseStore>,
    gateway: Arc<dyn ESignatureGateway>,
    notifications: Arc<dyn NotificationDispatcher>,
    config: SchedulerConfig,
}

impl DispatchJob {
    pub fn new(
        store: Arc<dyn LeaseStore>,
        gateway: Arc<dyn ESignatureGateway>,
        notifications: Arc<dyn NotificationDispatcher>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            notifications,
            config,
        }
    }

    /// Run one pass over the current candidates.
    ///
    /// # Errors
    /// Only the candidate listing itself can fail the run; per-renewal
    /// errors are absorbed into the report.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<JobReport, LeaseError> {
        let candidates = self.store.list_dispatch_candidates().await?;
        let mut report = JobReport::new(JOB_NAME);

        for renewal in candidates {
            report.processed += 1;
            match self.process(renewal.clone(), now).await {
                Ok(Outcome::Sent) => report.succeeded += 1,
                Ok(Outcome::Skipped(reason)) => {
                    tracing::debug!(luid = %renewal.luid, reason, "dispatch skipped");
                    report.skipped += 1;
                }
                Ok(Outcome::Failed(reason)) => {
                    tracing::warn!(luid = %renewal.luid, reason, "dispatch marked failed");
                    report.record_failure(renewal.luid.clone(), reason);
                }
                Err(e) => {
                    tracing::error!(luid = %renewal.luid, error = %e, "dispatch failed");
                    self.report_failure(&renewal, &e).await;
                    report.record_failure(renewal.luid.clone(), e.to_string());
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            sent = report.succeeded,
            skipped = report.skipped,
            failed = report.failed,
            "renewal dispatch run complete"
        );
        Ok(report)
    }

    async fn process(&self, mut renewal: Lease, now: DateTime<Utc>) -> Result<Outcome, LeaseError> {
        let Some(previous_id) = renewal.previous_lease_id else {
            return Err(LeaseError::validation(format!(
                "dispatch candidate {} has no original lease reference",
                renewal.luid
            )));
        };
        let original = self
            .store
            .find_by_id(previous_id)
            .await?
            .ok_or_else(|| LeaseError::NotFound(format!("original lease {previous_id}")))?;

        if !renewal.renewal_options.enable_auto_send_for_signature {
            return Ok(Outcome::Skipped("auto-send disabled"));
        }
        if renewal.signing_method != SigningMethod::Electronic {
            return Ok(Outcome::Skipped("not an electronic-signing lease"));
        }
        if renewal.esign_provider.is_none() {
            return self
                .mark_failed(renewal, "electronic signing enabled but no provider is set", now)
                .await;
        }

        let today = now.date_naive();
        if today - original.duration.end_date > Duration::days(self.config.dispatch_grace_days) {
            return self
                .mark_failed(
                    renewal,
                    "auto-send window missed; lease needs manual review",
                    now,
                )
                .await;
        }

        let Some(days_before) = renewal.renewal_options.days_before_expiry_to_auto_send_signature
        else {
            return Ok(Outcome::Skipped("no send offset configured"));
        };
        let target_send_date = original.duration.end_date - Duration::days(days_before);
        if today < target_send_date {
            return Ok(Outcome::Skipped("before target send date"));
        }

        send_lease_for_signature(&mut renewal, self.gateway.as_ref(), &self.config.sender, now)
            .await?;
        renewal.touch(Actor::System, "auto_send_for_signature", now);
        self.store.update(renewal).await?;
        Ok(Outcome::Sent)
    }

    async fn mark_failed(
        &self,
        mut renewal: Lease,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Outcome, LeaseError> {
        renewal.auto_send_info = Some(AutoSendInfo {
            failure_reason: Some(reason.to_string()),
            failed_at: Some(now),
        });
        renewal.touch(Actor::System, "auto_send_failed", now);
        self.store.update(renewal).await?;
        Ok(Outcome::Failed(reason.to_string()))
    }

    async fn report_failure(&self, renewal: &Lease, error: &LeaseError) {
        if let Err(e) = self
            .notifications
            .notify_system_error(&format!("renewal dispatch for {}", renewal.luid), error)
            .await
        {
            tracing::warn!(luid = %renewal.luid, error = %e, "failure notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use lessor_domain::{
        ApprovalStatus, ESignatureStatus, LeaseId, LeaseStatus, Luid,
    };
    use lessor_test_utils::fixtures::{active_lease, date};
    use lessor_test_utils::{MemoryLeaseStore, RecordingNotifier, StubGateway};
    use pretty_assertions::assert_eq;

    fn at(d: chrono::NaiveDate) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(d.year(), d.month(), d.day(), 6, 0, 0).unwrap()
    }

    /// Original active lease plus its approved, signature-ready renewal
    fn original_and_renewal(original_end: chrono::NaiveDate) -> (Lease, Lease) {
        let mut original = active_lease();
        original.duration.end_date = original_end;

        let mut renewal = active_lease();
        renewal.id = LeaseId::new();
        renewal.luid = Luid::generate();
        renewal.client_id = original.client_id;
        renewal.status = LeaseStatus::ReadyForSignature;
        renewal.approval_status = ApprovalStatus::Approved;
        renewal.previous_lease_id = Some(original.id);
        renewal.signing_method = SigningMethod::Electronic;
        renewal.esign_provider = Some("docuseal".into());
        renewal.renewal_options.enable_auto_send_for_signature = true;
        renewal.renewal_options.days_before_expiry_to_auto_send_signature = Some(14);
        (original, renewal)
    }

    fn job(
        store: Arc<MemoryLeaseStore>,
        gateway: Arc<StubGateway>,
    ) -> DispatchJob {
        DispatchJob::new(
            store,
            gateway,
            Arc::new(RecordingNotifier::new()),
            SchedulerConfig::new(lessor_core::SenderInfo {
                name: "Leasing Office".into(),
                email: "leasing@example.com".into(),
            }),
        )
    }

    #[tokio::test]
    async fn waits_until_target_send_date_then_sends_once() {
        let store = Arc::new(MemoryLeaseStore::new());
        let gateway = Arc::new(StubGateway::new());
        // end 2025-06-01, offset 14 -> target 2025-05-18
        let (original, renewal) = original_and_renewal(date(2025, 6, 1));
        let renewal_id = renewal.id;
        store.seed(original);
        store.seed(renewal);
        let job = job(Arc::clone(&store), Arc::clone(&gateway));

        let early = job.run(at(date(2025, 5, 17))).await.unwrap();
        assert_eq!(early.skipped, 1);
        assert_eq!(gateway.sent().len(), 0);
        assert_eq!(
            store.get(renewal_id).unwrap().status,
            LeaseStatus::ReadyForSignature
        );

        let on_target = job.run(at(date(2025, 5, 18))).await.unwrap();
        assert_eq!(on_target.succeeded, 1);
        assert_eq!(gateway.sent().len(), 1);
        let sent = store.get(renewal_id).unwrap();
        assert_eq!(sent.status, LeaseStatus::PendingSignature);
        let esign = sent.esignature.expect("envelope recorded");
        assert_eq!(esign.status, ESignatureStatus::Sent);
        assert_eq!(esign.envelope_id, "env-1");

        // now pending signature, no longer a candidate
        let again = job.run(at(date(2025, 5, 18))).await.unwrap();
        assert_eq!(again.processed, 0);
        assert_eq!(gateway.sent().len(), 1);
    }

    #[tokio::test]
    async fn missing_provider_is_marked_failed() {
        let store = Arc::new(MemoryLeaseStore::new());
        let gateway = Arc::new(StubGateway::new());
        let (original, mut renewal) = original_and_renewal(date(2025, 6, 1));
        renewal.esign_provider = None;
        let renewal_id = renewal.id;
        store.seed(original);
        store.seed(renewal);

        let report = job(Arc::clone(&store), gateway).run(at(date(2025, 5, 20))).await.unwrap();

        assert_eq!(report.failed, 1);
        let failed = store.get(renewal_id).unwrap();
        let info = failed.auto_send_info.expect("failure recorded");
        assert!(info.failure_reason.unwrap().contains("no provider"));
    }

    #[tokio::test]
    async fn expired_original_past_grace_is_marked_failed() {
        let store = Arc::new(MemoryLeaseStore::new());
        let gateway = Arc::new(StubGateway::new());
        let (original, renewal) = original_and_renewal(date(2025, 1, 1));
        let renewal_id = renewal.id;
        store.seed(original);
        store.seed(renewal);

        // 9 days past the original end, grace is 7
        let report = job(Arc::clone(&store), gateway).run(at(date(2025, 1, 10))).await.unwrap();

        assert_eq!(report.failed, 1);
        let info = store.get(renewal_id).unwrap().auto_send_info.expect("failure recorded");
        assert!(info.failure_reason.unwrap().contains("manual review"));
    }

    #[tokio::test]
    async fn disabled_auto_send_and_manual_signing_skip() {
        let store = Arc::new(MemoryLeaseStore::new());
        let gateway = Arc::new(StubGateway::new());

        let (original_a, mut disabled) = original_and_renewal(date(2025, 6, 1));
        disabled.renewal_options.enable_auto_send_for_signature = false;
        let (original_b, mut manual) = original_and_renewal(date(2025, 6, 1));
        manual.signing_method = SigningMethod::Manual;
        store.seed(original_a);
        store.seed(disabled);
        store.seed(original_b);
        store.seed(manual);

        let report = job(Arc::clone(&store), Arc::clone(&gateway))
            .run(at(date(2025, 5, 20)))
            .await
            .unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(gateway.sent().len(), 0);
    }

    #[tokio::test]
    async fn gateway_failure_never_aborts_the_batch() {
        let store = Arc::new(MemoryLeaseStore::new());
        let gateway = Arc::new(StubGateway::failing());
        let (original_a, renewal_a) = original_and_renewal(date(2025, 6, 1));
        let (original_b, renewal_b) = original_and_renewal(date(2025, 6, 1));
        store.seed(original_a);
        store.seed(renewal_a);
        store.seed(original_b);
        store.seed(renewal_b);

        let report = job(Arc::clone(&store), gateway).run(at(date(2025, 5, 20))).await.unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.failures.len(), 2);
    }
}
