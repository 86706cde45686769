//! # Aggregator Statistics
//!
//! Dashboard counters derived from the change stream: idempotent under
//! duplicate delivery, consistent with the store after rebuilds, and
//! tracking mean resolution time end to end.

#[cfg(test)]
mod tests {
    use crate::integration::{authority, citizen, classifier_for, pothole_report, quiet_grid, road_damage};
    use cg_02_lifecycle::{LifecycleApi, TransitionFields, TransitionRequest};
    use cg_04_aggregator::{Aggregator, StatsState};
    use shared_bus::{CivicEvent, EventPublisher};
    use shared_types::entities::{IssueStatus, MediaRef, ResolutionProof};
    use std::time::Duration;

    async fn wait_for<F: Fn(&cg_04_aggregator::AggregateStats) -> bool>(
        aggregator: &Aggregator,
        pred: F,
    ) {
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if pred(&aggregator.snapshot()) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("aggregator never reached expected state");
    }

    #[tokio::test]
    async fn test_full_lifecycle_updates_dashboard() {
        let services = quiet_grid();
        let auth = authority();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();
        wait_for(&services.aggregator, |s| s.by_status.pending == 1).await;

        classifier_for(&services, road_damage())
            .run_triage_once(issue.clone())
            .await;
        wait_for(&services.aggregator, |s| s.by_status.ai_analyzing == 1).await;

        let assigned = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Assigned,
                fields: TransitionFields::assigned_to(auth.user_id),
                expected_version: 2,
            })
            .await
            .unwrap();
        let in_progress = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::InProgress,
                fields: TransitionFields::default(),
                expected_version: assigned.version,
            })
            .await
            .unwrap();
        services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Resolved,
                fields: TransitionFields::resolved_with(ResolutionProof {
                    photo: MediaRef("after.jpg".to_string()),
                    notes: "done".to_string(),
                }),
                expected_version: in_progress.version,
            })
            .await
            .unwrap();

        wait_for(&services.aggregator, |s| s.resolved == 1).await;
        let stats = services.aggregator.snapshot();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_status.resolved, 1);
        assert_eq!(stats.by_status.pending, 0);
        let mean = stats.mean_resolution_ms.expect("mean after resolution");
        assert!(mean >= 0.0);

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_duplicate_bus_delivery_does_not_double_count() {
        let services = quiet_grid();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();
        wait_for(&services.aggregator, |s| s.total == 1).await;

        // Simulate at-least-once delivery: replay the same committed state.
        let replayed = services
            .lifecycle
            .get_issue(authority(), issue.id)
            .await
            .unwrap();
        services
            .bus
            .publish(CivicEvent::IssueUpserted(replayed.clone()))
            .await;
        services
            .bus
            .publish(CivicEvent::IssueUpserted(replayed))
            .await;

        // Give the worker time to (wrongly) double-count.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let stats = services.aggregator.snapshot();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_status.pending, 1);

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_rebuild_agrees_with_incremental_state() {
        let services = quiet_grid();
        let auth = authority();

        for _ in 0..3 {
            services
                .lifecycle
                .submit_issue(pothole_report(citizen()))
                .await
                .unwrap();
        }
        let rejected = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();
        services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: rejected.id,
                actor: auth,
                new_status: IssueStatus::Rejected,
                fields: TransitionFields::default(),
                expected_version: 1,
            })
            .await
            .unwrap();

        wait_for(&services.aggregator, |s| {
            s.total == 4 && s.by_status.rejected == 1
        })
        .await;
        let incremental = services.aggregator.snapshot();

        // A cold aggregator rebuilt from the store lands on the same counts.
        let rebuilt = Aggregator::new();
        rebuilt.rebuild(services.store.as_ref()).await.unwrap();
        let from_scan = rebuilt.snapshot();

        assert_eq!(from_scan.total, incremental.total);
        assert_eq!(from_scan.by_status, incremental.by_status);
        assert_eq!(from_scan.resolved, incremental.resolved);

        services.shutdown().await;
    }

    #[test]
    fn test_apply_twice_equals_apply_once() {
        // Pure-state statement of the idempotence property.
        let mut once = StatsState::new();
        let mut twice = StatsState::new();

        let issue = shared_types::entities::Issue {
            id: shared_types::entities::IssueId::new(),
            reporter_id: shared_types::entities::UserId::new(),
            category: shared_types::entities::IssueCategory::Garbage,
            description: "dump by the lake".to_string(),
            photos: vec![MediaRef("p1".to_string())],
            location: shared_types::entities::GeoPoint::new(12.9, 77.6),
            status: IssueStatus::Pending,
            priority: None,
            assigned_authority_id: None,
            resolution_proof: None,
            created_at: 1_000,
            assigned_at: None,
            resolved_at: None,
            version: 1,
        };

        once.apply(&issue);
        twice.apply(&issue);
        twice.apply(&issue);

        assert_eq!(once.snapshot().total, twice.snapshot().total);
        assert_eq!(once.snapshot().by_status, twice.snapshot().by_status);
    }
}
