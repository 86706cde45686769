//! # Optimistic Concurrency Properties
//!
//! Two actors racing on one record serialize on `version`: exactly one
//! write commits, the loser re-fetches. A late triage callback follows the
//! same discipline and can never clobber a human edit.

#[cfg(test)]
mod tests {
    use crate::integration::{authority, citizen, classifier_for, pothole_report, quiet_grid, road_damage};
    use cg_01_issue_store::ports::store::IssueStore as _;
    use cg_02_lifecycle::{LifecycleApi, TransitionFields, TransitionRequest};
    use shared_types::entities::IssueStatus;
    use shared_types::errors::CoreError;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_transitions_exactly_one_wins() {
        let services = quiet_grid();
        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();

        // Both racers target the same expected version with conflicting
        // intents: start analysis vs. reject outright.
        let lifecycle = services.lifecycle.clone();
        let reject = tokio::spawn({
            let lifecycle = lifecycle.clone();
            let issue_id = issue.id;
            async move {
                lifecycle
                    .transition_status(TransitionRequest {
                        issue_id,
                        actor: authority(),
                        new_status: IssueStatus::Rejected,
                        fields: TransitionFields::default(),
                        expected_version: 1,
                    })
                    .await
            }
        });
        let analyze = tokio::spawn({
            let lifecycle = lifecycle.clone();
            let issue_id = issue.id;
            async move {
                lifecycle
                    .transition_status(TransitionRequest {
                        issue_id,
                        actor: authority(),
                        new_status: IssueStatus::AiAnalyzing,
                        fields: TransitionFields::default(),
                        expected_version: 1,
                    })
                    .await
            }
        });

        let results = [reject.await.unwrap(), analyze.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(CoreError::Conflict { .. })))
            .count();

        assert_eq!(wins, 1, "exactly one racer must commit");
        assert_eq!(conflicts, 1, "the loser must observe Conflict");

        // Final version is initial + 1, never + 2.
        let current = services
            .lifecycle
            .get_issue(authority(), issue.id)
            .await
            .unwrap();
        assert_eq!(current.version, 2);

        services.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_many_writers_single_winner_per_round() {
        let services = quiet_grid();
        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();

        let mut racers = Vec::new();
        for _ in 0..16 {
            let lifecycle = services.lifecycle.clone();
            let issue_id = issue.id;
            racers.push(tokio::spawn(async move {
                lifecycle
                    .transition_status(TransitionRequest {
                        issue_id,
                        actor: authority(),
                        new_status: IssueStatus::Rejected,
                        fields: TransitionFields::default(),
                        expected_version: 1,
                    })
                    .await
            }));
        }

        let mut wins = 0;
        for racer in racers {
            match racer.await.unwrap() {
                Ok(_) => wins += 1,
                Err(CoreError::Conflict { .. }) => {}
                Err(CoreError::InvalidTransition { .. }) => {
                    // A racer that re-read after the winner sees a terminal
                    // record; also a legal loss. (Only reachable if get/CAS
                    // interleave across rounds, kept for completeness.)
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(wins, 1);

        let current = services
            .lifecycle
            .get_issue(authority(), issue.id)
            .await
            .unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(current.status, IssueStatus::Rejected);

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_conflict_loser_recovers_by_refetching() {
        let services = quiet_grid();
        let auth = authority();
        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();

        // Winner moves the record to ai_analyzing.
        services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::AiAnalyzing,
                fields: TransitionFields::default(),
                expected_version: 1,
            })
            .await
            .unwrap();

        // Loser still holds version 1 and must observe Conflict.
        let err = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Rejected,
                fields: TransitionFields::default(),
                expected_version: 1,
            })
            .await
            .unwrap_err();
        let CoreError::Conflict { actual, .. } = err else {
            panic!("expected Conflict, got {err:?}");
        };

        // Re-fetch at the reported version and retry: commits.
        let rejected = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Rejected,
                fields: TransitionFields::default(),
                expected_version: actual,
            })
            .await
            .unwrap();
        assert_eq!(rejected.status, IssueStatus::Rejected);
        assert_eq!(rejected.version, actual + 1);

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_late_triage_cannot_clobber_authority_edit() {
        let services = quiet_grid();
        let auth = authority();
        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();

        // Authority rejects before the classifier answers.
        let rejected = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Rejected,
                fields: TransitionFields::default(),
                expected_version: 1,
            })
            .await
            .unwrap();

        // Deliver the triage result late; the terminal record must stand.
        classifier_for(&services, road_damage())
            .run_triage_once(issue.clone())
            .await;

        let current = services.lifecycle.get_issue(auth, issue.id).await.unwrap();
        assert_eq!(current.status, IssueStatus::Rejected);
        assert_eq!(current.version, rejected.version);

        services.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_store_level_cas_serializes_raw_writers() {
        let services = quiet_grid();
        let store = services.store.clone();
        let issue = store
            .create(cg_01_issue_store::NewIssue {
                reporter_id: shared_types::entities::UserId::new(),
                description: "flooded underpass".to_string(),
                photos: vec![shared_types::entities::MediaRef("p1".to_string())],
                location: shared_types::entities::GeoPoint::new(12.9, 77.6),
            })
            .await
            .unwrap();

        let mut writers = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let mut updated = issue.clone();
            updated.status = IssueStatus::AiAnalyzing;
            updated.version = 2;
            writers.push(tokio::spawn(async move {
                store.compare_and_set(1, updated).await
            }));
        }

        let mut wins = 0;
        for writer in writers {
            if writer.await.unwrap().is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(store.get(&issue.id).await.unwrap().version, 2);

        services.shutdown().await;
    }
}
