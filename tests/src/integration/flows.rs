//! # Integration Test Flows
//!
//! End-to-end lifecycle choreography across the store, bus, lifecycle
//! service, and workers: submit, triage, assign, progress, resolve, with
//! the role gate and transition validator enforced at every hop.

#[cfg(test)]
mod tests {
    use crate::integration::{
        authority, citizen, classifier_for, demo_grid, grid_with_triage, pothole_report,
        quiet_grid, road_damage,
    };
    use cg_02_lifecycle::adapters::mock::MockTriageClient;
    use cg_02_lifecycle::{
        LifecycleApi, TransitionFields, TransitionRequest,
    };
    use shared_types::entities::{
        Actor, Issue, IssueCategory, IssueId, IssueStatus, MediaRef, Priority, ResolutionProof,
        UserId,
    };
    use shared_types::errors::CoreError;
    use std::sync::Arc;
    use std::time::Duration;

    /// Poll until the issue satisfies `pred`, or fail after one second.
    async fn wait_for(
        services: &civic_runtime::GridServices,
        viewer: Actor,
        issue_id: IssueId,
        pred: impl Fn(&Issue) -> bool,
    ) -> Issue {
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let current = services
                    .lifecycle
                    .get_issue(viewer, issue_id)
                    .await
                    .expect("issue should exist");
                if pred(&current) {
                    return current;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition never reached")
    }

    fn proof() -> ResolutionProof {
        ResolutionProof {
            photo: MediaRef("after.jpg".to_string()),
            notes: "filled".to_string(),
        }
    }

    // =========================================================================
    // SCENARIO A: submission
    // =========================================================================

    #[tokio::test]
    async fn test_scenario_a_submission_creates_pending_v1() {
        let services = demo_grid();
        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();

        assert_eq!(issue.status, IssueStatus::Pending);
        assert!(issue.priority.is_none());
        assert_eq!(issue.version, 1);
        assert_eq!(issue.description, "Pothole on Main St");

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_submission_validation_failures() {
        let services = demo_grid();

        let mut no_photos = pothole_report(citizen());
        no_photos.photos.clear();
        assert!(matches!(
            services.lifecycle.submit_issue(no_photos).await,
            Err(CoreError::Validation(_))
        ));

        let mut blank_description = pothole_report(citizen());
        blank_description.description = "  ".to_string();
        assert!(matches!(
            services.lifecycle.submit_issue(blank_description).await,
            Err(CoreError::Validation(_))
        ));

        services.shutdown().await;
    }

    // =========================================================================
    // SCENARIO B: triage then assignment, in that order
    // =========================================================================

    #[tokio::test]
    async fn test_scenario_b_classification_then_assignment() {
        let services = quiet_grid();
        let auth = authority();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();

        // Jumping straight to assigned is an illegal edge from pending.
        let err = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Assigned,
                fields: TransitionFields::assigned_to(auth.user_id),
                expected_version: issue.version,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        // The triage pass lands pending -> ai_analyzing as v2.
        classifier_for(&services, road_damage())
            .run_triage_once(issue.clone())
            .await;
        let analyzed = wait_for(&services, auth, issue.id, |i| {
            i.status == IssueStatus::AiAnalyzing
        })
        .await;
        assert_eq!(analyzed.version, 2);
        assert_eq!(analyzed.category, IssueCategory::RoadDamage);
        assert_eq!(analyzed.priority, Some(Priority::High));

        // Now assignment commits as v3.
        let assigned = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Assigned,
                fields: TransitionFields::assigned_to(auth.user_id),
                expected_version: analyzed.version,
            })
            .await
            .unwrap();
        assert_eq!(assigned.status, IssueStatus::Assigned);
        assert_eq!(assigned.version, 3);
        assert_eq!(assigned.assigned_authority_id, Some(auth.user_id));
        assert!(assigned.assigned_at.is_some());

        services.shutdown().await;
    }

    // =========================================================================
    // SCENARIO C: resolution requires proof
    // =========================================================================

    #[tokio::test]
    async fn test_scenario_c_resolution_requires_proof() {
        let services = demo_grid();
        let auth = authority();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();
        let analyzed = wait_for(&services, auth, issue.id, |i| {
            i.status == IssueStatus::AiAnalyzing
        })
        .await;

        let assigned = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Assigned,
                fields: TransitionFields::assigned_to(auth.user_id),
                expected_version: analyzed.version,
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

        // No proof, no resolution; the record is left untouched.
        let err = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Resolved,
                fields: TransitionFields::default(),
                expected_version: in_progress.version,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        let unchanged = services.lifecycle.get_issue(auth, issue.id).await.unwrap();
        assert_eq!(unchanged.status, IssueStatus::InProgress);
        assert_eq!(unchanged.version, in_progress.version);

        let resolved = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Resolved,
                fields: TransitionFields::resolved_with(proof()),
                expected_version: in_progress.version,
            })
            .await
            .unwrap();
        assert_eq!(resolved.status, IssueStatus::Resolved);
        assert!(resolved.resolved_at.is_some());
        assert!(resolved.timestamps_consistent());

        services.shutdown().await;
    }

    // =========================================================================
    // SCENARIO D: role gate
    // =========================================================================

    #[tokio::test]
    async fn test_scenario_d_citizen_transitions_denied() {
        let services = demo_grid();
        let reporter = citizen();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(reporter))
            .await
            .unwrap();

        // Another citizen: authorization fails before transition legality is
        // even considered.
        let other = citizen();
        let err = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: other,
                new_status: IssueStatus::AiAnalyzing,
                fields: TransitionFields::default(),
                expected_version: issue.version,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Authorization { .. }));

        // The reporter fares no better; transitions are authority-only.
        let err = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: reporter,
                new_status: IssueStatus::AiAnalyzing,
                fields: TransitionFields::default(),
                expected_version: issue.version,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Authorization { .. }));

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_read_visibility() {
        let services = demo_grid();
        let reporter = citizen();
        let issue = services
            .lifecycle
            .submit_issue(pothole_report(reporter))
            .await
            .unwrap();

        assert!(services.lifecycle.get_issue(reporter, issue.id).await.is_ok());
        assert!(services
            .lifecycle
            .get_issue(authority(), issue.id)
            .await
            .is_ok());
        assert!(matches!(
            services.lifecycle.get_issue(citizen(), issue.id).await,
            Err(CoreError::Authorization { .. })
        ));

        services.shutdown().await;
    }

    // =========================================================================
    // TRIAGE FALLBACK
    // =========================================================================

    #[tokio::test]
    async fn test_triage_exhaustion_falls_back_to_manual_review() {
        let services = quiet_grid();
        let auth = authority();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();

        // Drive the retry loop deterministically with a tight budget.
        let tight = cg_02_lifecycle::LifecycleService::new(
            services.store.clone(),
            Arc::new(MockTriageClient::failing("model offline")),
            services.bus.clone(),
            Arc::new(shared_types::time::SystemTimeSource),
            cg_02_lifecycle::TriageConfig {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                call_timeout: Duration::from_millis(50),
            },
        );
        tight.run_triage_once(issue.clone()).await;

        let reviewed = services.lifecycle.get_issue(auth, issue.id).await.unwrap();
        assert_eq!(reviewed.status, IssueStatus::AiAnalyzing);
        assert_eq!(reviewed.category, IssueCategory::NeedsManualReview);
        assert_eq!(reviewed.priority, Some(Priority::Medium));

        // Authorities can still triage manually from here.
        let assigned = services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::Assigned,
                fields: TransitionFields::assigned_to(auth.user_id),
                expected_version: reviewed.version,
            })
            .await
            .unwrap();
        assert_eq!(assigned.status, IssueStatus::Assigned);

        services.shutdown().await;
    }
}
