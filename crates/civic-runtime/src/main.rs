//! CivicGrid engine binary.
//!
//! Wires the subsystems with demo collaborator adapters, walks one issue
//! through its full lifecycle so a fresh checkout shows the choreography
//! end to end, then serves until Ctrl-C.

use anyhow::{Context, Result};
use cg_02_lifecycle::adapters::mock::{
    InMemoryMediaStore, MockTriageClient, RecordingDispatcher,
};
use cg_02_lifecycle::{
    LifecycleApi, MediaStore, SubmitIssue, TransitionFields, TransitionRequest, TriageResult,
};
use civic_runtime::{GridConfig, GridServices};
use civic_telemetry::{init_telemetry, TelemetryConfig};
use shared_types::entities::{
    Actor, GeoPoint, IssueCategory, IssueStatus, MediaRef, Priority, ResolutionProof, Role, User,
    UserId,
};
use shared_types::filters::IssueFilter;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry_config = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry_config).context("telemetry init failed")?;

    let config = GridConfig::default();
    config.validate().context("invalid configuration")?;

    let services = GridServices::build(
        &config,
        Arc::new(MockTriageClient::always(TriageResult {
            category: IssueCategory::RoadDamage,
            priority: Priority::High,
            confidence: 0.91,
        })),
        Arc::new(RecordingDispatcher::new()),
    );

    demo_flow(&services).await?;

    info!("CivicGrid running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("signal wait failed")?;

    services.shutdown().await;
    Ok(())
}

/// Walk one issue from report to resolution, logging each hop.
async fn demo_flow(services: &GridServices) -> Result<()> {
    use cg_01_issue_store::ports::store::UserStore as _;

    let citizen = Actor {
        user_id: UserId::new(),
        role: Role::Citizen,
    };
    let authority = Actor {
        user_id: UserId::new(),
        role: Role::Authority,
    };

    services
        .users
        .put_user(User {
            id: citizen.user_id,
            role: Role::Citizen,
            display_name: "Asha".to_string(),
            email: "asha@example.org".to_string(),
            phone: None,
        })
        .await?;
    services
        .users
        .put_user(User {
            id: authority.user_id,
            role: Role::Authority,
            display_name: "Ward Office 12".to_string(),
            email: "ward12@example.gov".to_string(),
            phone: Some("+91-80-0000-0000".to_string()),
        })
        .await?;

    // Citizen view: live feed of their own issues.
    let mut feed = services
        .broker
        .subscribe(IssueFilter::owned_by(citizen.user_id), None)
        .await?;

    // The photo goes to the media store first; only the reference enters
    // the core.
    let media = InMemoryMediaStore::new();
    let photo = media
        .upload(b"\xff\xd8\xff demo pothole photo", "image/jpeg")
        .await?;

    let issue = services
        .lifecycle
        .submit_issue(SubmitIssue {
            reporter: citizen,
            description: "Pothole on Main St".to_string(),
            photos: vec![photo],
            location: GeoPoint::new(12.9, 77.6),
        })
        .await?;
    info!(issue_id = %issue.id, "Demo issue submitted");

    // Wait for the fire-and-forget triage pass to land.
    let analyzed = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let current = services.lifecycle.get_issue(authority, issue.id).await?;
            if current.status != IssueStatus::Pending {
                return anyhow::Ok(current);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .context("triage never landed")??;
    info!(
        category = ?analyzed.category,
        priority = ?analyzed.priority,
        "Demo issue classified"
    );

    // Authority drives the rest of the lifecycle.
    let assigned = services
        .lifecycle
        .transition_status(TransitionRequest {
            issue_id: issue.id,
            actor: authority,
            new_status: IssueStatus::Assigned,
            fields: TransitionFields::assigned_to(authority.user_id),
            expected_version: analyzed.version,
        })
        .await?;
    let in_progress = services
        .lifecycle
        .transition_status(TransitionRequest {
            issue_id: issue.id,
            actor: authority,
            new_status: IssueStatus::InProgress,
            fields: TransitionFields::default(),
            expected_version: assigned.version,
        })
        .await?;
    let resolved = services
        .lifecycle
        .transition_status(TransitionRequest {
            issue_id: issue.id,
            actor: authority,
            new_status: IssueStatus::Resolved,
            fields: TransitionFields::resolved_with(ResolutionProof {
                photo: MediaRef("media://pothole-1-fixed.jpg".to_string()),
                notes: "Filled and resurfaced".to_string(),
            }),
            expected_version: in_progress.version,
        })
        .await?;
    info!(version = resolved.version, "Demo issue resolved");

    // Drain what the citizen's feed observed.
    let mut observed = 0;
    while observed < resolved.version {
        match tokio::time::timeout(Duration::from_secs(1), feed.recv()).await {
            Ok(Some(event)) => {
                info!(event = ?event, "Citizen feed event");
                observed += 1;
            }
            _ => break,
        }
    }

    let stats = services
        .aggregate_stats(&citizen)
        .context("stats read denied")?;
    info!(
        total = stats.total,
        resolved = stats.resolved,
        mean_resolution_ms = ?stats.mean_resolution_ms,
        "Landing-page statistics"
    );

    Ok(())
}
