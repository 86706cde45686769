//! # Subscription Continuity
//!
//! A client that disconnects and resubscribes with a `since_version`
//! watermark sees every change it missed, then the live stream, with no gap
//! and no per-issue regression.

#[cfg(test)]
mod tests {
    use crate::integration::{authority, citizen, classifier_for, pothole_report, quiet_grid, road_damage};
    use cg_02_lifecycle::{LifecycleApi, TransitionFields, TransitionRequest};
    use cg_03_subscriptions::FeedEvent;
    use shared_types::entities::{IssueId, IssueStatus};
    use shared_types::filters::IssueFilter;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next_upsert(feed: &mut cg_03_subscriptions::IssueFeed) -> shared_types::entities::Issue {
        loop {
            let event = timeout(Duration::from_secs(1), feed.recv())
                .await
                .expect("timed out waiting for feed event")
                .expect("feed ended unexpectedly");
            match event {
                FeedEvent::Upsert(issue) => return issue,
                FeedEvent::Heartbeat { .. } => continue,
            }
        }
    }

    #[tokio::test]
    async fn test_citizen_feed_follows_own_issue_lifecycle() {
        let services = quiet_grid();
        let reporter = citizen();
        let auth = authority();

        let mut feed = services
            .broker
            .subscribe(IssueFilter::owned_by(reporter.user_id), None)
            .await
            .unwrap();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(reporter))
            .await
            .unwrap();
        // Noise from another citizen must not show up on this feed.
        services
            .lifecycle
            .submit_issue(pothole_report(citizen()))
            .await
            .unwrap();

        let v1 = next_upsert(&mut feed).await;
        assert_eq!(v1.id, issue.id);
        assert_eq!(v1.version, 1);
        assert_eq!(v1.status, IssueStatus::Pending);

        classifier_for(&services, road_damage())
            .run_triage_once(issue.clone())
            .await;
        let v2 = next_upsert(&mut feed).await;
        assert_eq!(v2.version, 2);
        assert_eq!(v2.status, IssueStatus::AiAnalyzing);

        services
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
        let v3 = next_upsert(&mut feed).await;
        assert_eq!(v3.version, 3);
        assert_eq!(v3.status, IssueStatus::Assigned);

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_resubscribe_with_watermark_catches_up_without_gap() {
        let services = quiet_grid();
        let reporter = citizen();
        let auth = authority();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(reporter))
            .await
            .unwrap();

        // First connection observes version 1, then drops.
        {
            let mut feed = services
                .broker
                .subscribe(IssueFilter::owned_by(reporter.user_id), None)
                .await
                .unwrap();
            let seen = next_upsert(&mut feed).await;
            assert_eq!(seen.version, 1);
        } // feed dropped here

        // Changes land while the client is offline.
        classifier_for(&services, road_damage())
            .run_triage_once(issue.clone())
            .await;
        services
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

        // Resubscribe with the watermark: catch-up delivers the current
        // state (v3), then live continues.
        let mut feed = services
            .broker
            .subscribe(IssueFilter::owned_by(reporter.user_id), Some(1))
            .await
            .unwrap();
        let caught_up = next_upsert(&mut feed).await;
        assert_eq!(caught_up.id, issue.id);
        assert_eq!(caught_up.version, 3);
        assert_eq!(caught_up.status, IssueStatus::Assigned);

        // Live continues seamlessly after the snapshot.
        services
            .lifecycle
            .transition_status(TransitionRequest {
                issue_id: issue.id,
                actor: auth,
                new_status: IssueStatus::InProgress,
                fields: TransitionFields::default(),
                expected_version: 3,
            })
            .await
            .unwrap();
        let live = next_upsert(&mut feed).await;
        assert_eq!(live.version, 4);
        assert_eq!(live.status, IssueStatus::InProgress);

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_per_issue_versions_never_regress_on_a_feed() {
        let services = quiet_grid();
        let auth = authority();

        // Several issues moving concurrently.
        let mut issues = Vec::new();
        for _ in 0..3 {
            issues.push(
                services
                    .lifecycle
                    .submit_issue(pothole_report(citizen()))
                    .await
                    .unwrap(),
            );
        }

        let mut feed = services
            .broker
            .subscribe(IssueFilter::All, None)
            .await
            .unwrap();

        for issue in &issues {
            classifier_for(&services, road_damage())
                .run_triage_once(issue.clone())
                .await;
        }
        for issue in &issues {
            services
                .lifecycle
                .transition_status(TransitionRequest {
                    issue_id: issue.id,
                    actor: auth,
                    new_status: IssueStatus::Rejected,
                    fields: TransitionFields::default(),
                    expected_version: 2,
                })
                .await
                .unwrap();
        }

        // 3 snapshot + 3 classifications + 3 rejections.
        let mut last_version: HashMap<IssueId, u64> = HashMap::new();
        for _ in 0..9 {
            let upsert = next_upsert(&mut feed).await;
            let last = last_version.get(&upsert.id).copied().unwrap_or(0);
            assert!(
                upsert.version > last,
                "feed regressed issue {} from {} to {}",
                upsert.id,
                last,
                upsert.version
            );
            last_version.insert(upsert.id, upsert.version);
        }
        assert_eq!(last_version.len(), 3);
        assert!(last_version.values().all(|&v| v == 3));

        services.shutdown().await;
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_resources_and_keeps_store_intact() {
        let services = quiet_grid();
        let reporter = citizen();

        let issue = services
            .lifecycle
            .submit_issue(pothole_report(reporter))
            .await
            .unwrap();

        let base_subscribers = services.bus.subscriber_count();
        let feed = services
            .broker
            .subscribe(IssueFilter::All, None)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(services.bus.subscriber_count(), base_subscribers + 1);

        feed.unsubscribe();
        timeout(Duration::from_secs(1), async {
            while services.bus.subscriber_count() != base_subscribers {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("bus subscription leaked after unsubscribe");

        // Unsubscribing has no effect on the Entity Store.
        let still_there = services
            .lifecycle
            .get_issue(reporter, issue.id)
            .await
            .unwrap();
        assert_eq!(still_there.version, 1);

        services.shutdown().await;
    }
}
