//! Session record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::events::Viewport;

/// One browsing visit, accumulating engagement metrics server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSession {
    /// Client-generated id, immutable after creation.
    pub id: String,
    /// Server-assigned at creation.
    pub start_time: DateTime<Utc>,
    /// Refreshed on every mutation; always >= start_time.
    pub last_activity: DateTime<Utc>,
    /// Active seconds on page, monotone under correct client behavior.
    pub total_time_on_page: i64,
    /// Percentage in [0, 100], monotone under correct client behavior.
    pub max_scroll_depth: u8,
    pub page_views: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

/// Inbound session creation: the record minus the server-assigned timestamps.
///
/// The session id is the one client-chosen identity in the system, which is
/// what makes duplicate creation possible at all; see the store for how
/// that is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub total_time_on_page: i64,
    #[validate(range(min = 0, max = 100))]
    #[serde(default)]
    pub max_scroll_depth: u8,
    #[validate(range(min = 1))]
    #[serde(default = "default_page_views")]
    pub page_views: u32,
    #[validate(length(max = 512))]
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

fn default_page_views() -> u32 {
    1
}

/// Partial session mutation. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[validate(range(min = 0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time_on_page: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_scroll_depth: Option<u8>,
    #[validate(range(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_views: Option<u32>,
}

impl SessionPatch {
    pub fn scroll_depth(depth: u8) -> Self {
        Self {
            max_scroll_depth: Some(depth),
            ..Self::default()
        }
    }

    pub fn time_on_page(seconds: i64) -> Self {
        Self {
            total_time_on_page: Some(seconds),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_time_on_page.is_none()
            && self.max_scroll_depth.is_none()
            && self.page_views.is_none()
    }

    /// Folds another patch into this one, later values winning.
    pub fn merge(&mut self, other: SessionPatch) {
        if other.total_time_on_page.is_some() {
            self.total_time_on_page = other.total_time_on_page;
        }
        if other.max_scroll_depth.is_some() {
            self.max_scroll_depth = other.max_scroll_depth;
        }
        if other.page_views.is_some() {
            self.page_views = other.page_views;
        }
    }
}
