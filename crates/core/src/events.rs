//! Event type definitions for the analytics collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::limits::MAX_EVENT_DATA_BYTES;

/// Coarse device classification derived from window width client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Mobile,
    Tablet,
    Desktop,
}

impl Viewport {
    /// Classifies a window width in CSS pixels.
    pub fn from_width(width: u32) -> Self {
        if width < 768 {
            Self::Mobile
        } else if width < 1024 {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }
}

/// Event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Click,
    Scroll,
    Time,
    Pageview,
}

impl EventType {
    /// Derives the category for an event name.
    ///
    /// Total over the closed name set: scroll-depth names map to `Scroll`,
    /// time-on-page names to `Time`, view names to `Pageview`, and every
    /// interaction name to `Click`. The naming convention keeps "view" out
    /// of scroll/time names, so the partition has no overlaps.
    pub fn for_name(name: EventName) -> Self {
        use EventName::*;
        match name {
            ScrollDepth25 | ScrollDepth50 | ScrollDepth75 | ScrollDepth100 => Self::Scroll,
            TimeOnPage30s | TimeOnPage60s | TimeOnPage120s | TimeOnPage300s => Self::Time,
            HomepageView => Self::Pageview,
            HeroCta | WhyChooseCta | CollectionCta | BasicPackage | PremiumPackage
            | BooksCarouselPrev | BooksCarouselNext | TestimonialsCarouselPrev
            | TestimonialsCarouselNext | FaqToggle => Self::Click,
        }
    }
}

/// Closed enumeration of tracked occurrences.
///
/// Wire names are load-bearing: dashboards and the page instrumentation
/// both key off these exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    // CTA button clicks
    #[serde(rename = "hero_cta_click")]
    HeroCta,
    #[serde(rename = "why_choose_cta_click")]
    WhyChooseCta,
    #[serde(rename = "collection_cta_click")]
    CollectionCta,

    // Package purchase buttons
    #[serde(rename = "basic_package_click")]
    BasicPackage,
    #[serde(rename = "premium_package_click")]
    PremiumPackage,

    // Carousel interactions
    #[serde(rename = "books_carousel_prev")]
    BooksCarouselPrev,
    #[serde(rename = "books_carousel_next")]
    BooksCarouselNext,
    #[serde(rename = "testimonials_carousel_prev")]
    TestimonialsCarouselPrev,
    #[serde(rename = "testimonials_carousel_next")]
    TestimonialsCarouselNext,

    // FAQ interactions
    #[serde(rename = "faq_toggle")]
    FaqToggle,

    // Scroll depth milestones
    #[serde(rename = "scroll_depth_25")]
    ScrollDepth25,
    #[serde(rename = "scroll_depth_50")]
    ScrollDepth50,
    #[serde(rename = "scroll_depth_75")]
    ScrollDepth75,
    #[serde(rename = "scroll_depth_100")]
    ScrollDepth100,

    // Time on page milestones
    #[serde(rename = "time_on_page_30s")]
    TimeOnPage30s,
    #[serde(rename = "time_on_page_60s")]
    TimeOnPage60s,
    #[serde(rename = "time_on_page_120s")]
    TimeOnPage120s,
    #[serde(rename = "time_on_page_300s")]
    TimeOnPage300s,

    // Page views
    #[serde(rename = "homepage_view")]
    HomepageView,
}

impl EventName {
    /// The wire string for this name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeroCta => "hero_cta_click",
            Self::WhyChooseCta => "why_choose_cta_click",
            Self::CollectionCta => "collection_cta_click",
            Self::BasicPackage => "basic_package_click",
            Self::PremiumPackage => "premium_package_click",
            Self::BooksCarouselPrev => "books_carousel_prev",
            Self::BooksCarouselNext => "books_carousel_next",
            Self::TestimonialsCarouselPrev => "testimonials_carousel_prev",
            Self::TestimonialsCarouselNext => "testimonials_carousel_next",
            Self::FaqToggle => "faq_toggle",
            Self::ScrollDepth25 => "scroll_depth_25",
            Self::ScrollDepth50 => "scroll_depth_50",
            Self::ScrollDepth75 => "scroll_depth_75",
            Self::ScrollDepth100 => "scroll_depth_100",
            Self::TimeOnPage30s => "time_on_page_30s",
            Self::TimeOnPage60s => "time_on_page_60s",
            Self::TimeOnPage120s => "time_on_page_120s",
            Self::TimeOnPage300s => "time_on_page_300s",
            Self::HomepageView => "homepage_view",
        }
    }

    /// Every name in the closed set, for exhaustiveness tests.
    pub fn all() -> &'static [EventName] {
        use EventName::*;
        &[
            HeroCta,
            WhyChooseCta,
            CollectionCta,
            BasicPackage,
            PremiumPackage,
            BooksCarouselPrev,
            BooksCarouselNext,
            TestimonialsCarouselPrev,
            TestimonialsCarouselNext,
            FaqToggle,
            ScrollDepth25,
            ScrollDepth50,
            ScrollDepth75,
            ScrollDepth100,
            TimeOnPage30s,
            TimeOnPage60s,
            TimeOnPage120s,
            TimeOnPage300s,
            HomepageView,
        ]
    }

    /// Derived category, see [`EventType::for_name`].
    pub fn event_type(&self) -> EventType {
        EventType::for_name(*self)
    }
}

/// Validates the free-form event data size.
fn validate_event_data_size(data: &serde_json::Value) -> Result<(), ValidationError> {
    if data.is_null() {
        return Ok(());
    }

    let size = serde_json::to_vec(data).map(|v| v.len()).unwrap_or(0);

    if size > MAX_EVENT_DATA_BYTES {
        let mut err = ValidationError::new("event_data_too_large");
        err.message = Some(
            format!(
                "eventData {}KB exceeds {}KB limit",
                size / 1024,
                MAX_EVENT_DATA_BYTES / 1024
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// A stored analytics event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    /// Server-generated event ID.
    pub id: Uuid,
    /// Owning session (lookup-only reference, not enforced by a join).
    pub session_id: String,
    pub event_type: EventType,
    pub event_name: EventName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_data: Option<serde_json::Value>,
    /// Assigned at persistence time; client clocks are not trusted for ordering.
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

/// Inbound event submission: an event minus the server-assigned fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    pub event_type: EventType,
    pub event_name: EventName,
    #[validate(custom(function = "validate_event_data_size"))]
    #[serde(default)]
    pub event_data: Option<serde_json::Value>,
    #[validate(length(max = 512))]
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub viewport: Option<Viewport>,
}
