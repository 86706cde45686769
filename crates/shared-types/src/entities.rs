//! # Core Domain Entities
//!
//! Defines the civic-issue entities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Reporting**: `Issue`, `IssueCategory`, `Priority`, `ResolutionProof`
//! - **Accounts**: `User`, `Role`, `Actor`
//! - **Location & Media**: `GeoPoint`, `MediaRef`

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub Uuid);

impl IssueId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a user account (citizen or authority).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An opaque reference into the external media store.
///
/// The core only ever holds the reference, never the photo bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef(pub String);

impl MediaRef {
    /// True if the reference is blank (always invalid).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geographic location attached by the reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, [-90, 90].
    pub lat: f64,
    /// Longitude in degrees, [-180, 180].
    pub lng: f64,
    /// Optional human-readable address.
    pub address: Option<String>,
}

impl GeoPoint {
    /// Create a point without an address.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            address: None,
        }
    }

    /// True if both coordinates are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to another point in meters (haversine).
    #[must_use]
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

/// Fixed issue categories.
///
/// `Unclassified` is the placeholder while triage is outstanding;
/// `NeedsManualReview` is applied when the triage retry budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    RoadDamage,
    Streetlight,
    Garbage,
    Water,
    Drainage,
    Parks,
    TrafficSignal,
    Other,
    /// Awaiting AI triage.
    Unclassified,
    /// Triage gave up; an authority must classify by hand.
    NeedsManualReview,
}

/// Issue lifecycle states.
///
/// ```text
/// pending ──→ ai_analyzing ──→ assigned ──→ in_progress ──→ resolved
///    │              │              │              │
///    └──────────────┴──────────────┴──────────────┴───────→ rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    AiAnalyzing,
    Assigned,
    InProgress,
    Resolved,
    Rejected,
}

impl IssueStatus {
    /// Terminal states never transition again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::AiAnalyzing => "ai_analyzing",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Triage priority, unset until classification completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Evidence attached when an issue is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionProof {
    /// Photo of the completed work.
    pub photo: MediaRef,
    /// Free-text notes from the resolving authority.
    pub notes: String,
}

impl ResolutionProof {
    /// A proof must carry both a photo reference and notes.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.photo.is_empty() && !self.notes.trim().is_empty()
    }
}

/// A single reported civic problem and its full lifecycle record.
///
/// `description`, `photos`, `location`, `reporter_id` and `created_at` are
/// immutable after creation; corrections create a new issue. `version`
/// increases by exactly 1 on every committed write and drives optimistic
/// concurrency control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Opaque unique identifier, assigned at creation.
    pub id: IssueId,
    /// The citizen who reported the issue.
    pub reporter_id: UserId,
    /// Fixed category, `Unclassified` until triage completes.
    pub category: IssueCategory,
    /// Free-text description (append-only record).
    pub description: String,
    /// Ordered photo references; at least one.
    pub photos: Vec<MediaRef>,
    /// Location attached by the reporter.
    pub location: GeoPoint,
    /// Current lifecycle state.
    pub status: IssueStatus,
    /// Unset until triage completes.
    pub priority: Option<Priority>,
    /// Set on the transition into `Assigned`.
    pub assigned_authority_id: Option<UserId>,
    /// Set only on the transition into `Resolved`.
    pub resolution_proof: Option<ResolutionProof>,
    /// Creation time; never revised.
    pub created_at: Timestamp,
    /// Present iff status is `Assigned`, `InProgress` or `Resolved`.
    pub assigned_at: Option<Timestamp>,
    /// Present iff status is `Resolved`.
    pub resolved_at: Option<Timestamp>,
    /// Monotonically increasing write counter, starts at 1.
    pub version: u64,
}

impl Issue {
    /// Check the timestamp-iff-status invariants.
    #[must_use]
    pub fn timestamps_consistent(&self) -> bool {
        let assigned_expected = matches!(
            self.status,
            IssueStatus::Assigned | IssueStatus::InProgress | IssueStatus::Resolved
        );
        let resolved_expected = self.status == IssueStatus::Resolved;

        self.assigned_at.is_some() == assigned_expected
            && self.resolved_at.is_some() == resolved_expected
    }
}

/// Account role, fixed at account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Authority,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub role: Role,
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// An authenticated caller as supplied by the identity provider.
///
/// The core trusts this pair as given and performs no credential
/// verification itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}
