//! # Issue Filters
//!
//! Client-declared predicates over issues, shared by the store's `list`
//! operation and the subscription broker's live feeds.

use crate::entities::{Issue, IssueStatus, UserId};
use serde::{Deserialize, Serialize};

/// A predicate selecting a subset of issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IssueFilter {
    /// Every issue (authority dashboard, landing page).
    All,
    /// Issues reported by one citizen ("my issues" view).
    OwnedBy { user_id: UserId },
    /// Issues currently in one status.
    ByStatus { status: IssueStatus },
    /// Issues within `radius_meters` of a point.
    Near {
        lat: f64,
        lng: f64,
        radius_meters: f64,
    },
}

impl IssueFilter {
    /// Filter for one citizen's own issues.
    #[must_use]
    pub fn owned_by(user_id: UserId) -> Self {
        Self::OwnedBy { user_id }
    }

    /// Filter by current status.
    #[must_use]
    pub fn by_status(status: IssueStatus) -> Self {
        Self::ByStatus { status }
    }

    /// Filter by proximity to a point.
    #[must_use]
    pub fn near(lat: f64, lng: f64, radius_meters: f64) -> Self {
        Self::Near {
            lat,
            lng,
            radius_meters,
        }
    }

    /// Check whether an issue matches this filter.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        match self {
            Self::All => true,
            Self::OwnedBy { user_id } => issue.reporter_id == *user_id,
            Self::ByStatus { status } => issue.status == *status,
            Self::Near {
                lat,
                lng,
                radius_meters,
            } => {
                let center = crate::entities::GeoPoint::new(*lat, *lng);
                center.distance_meters(&issue.location) <= *radius_meters
            }
        }
    }
}

impl Default for IssueFilter {
    fn default() -> Self {
        Self::All
    }
}
