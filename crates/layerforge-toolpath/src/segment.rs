//! Moves that make up a layer toolpath.

use layerforge_geometry::Point2D;
use serde::{Deserialize, Serialize};

/// What the head does during a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolpathSegmentType {
    /// Move without extruding
    Travel,
    /// Move while extruding
    Extrude,
    /// Wait in place
    Dwell,
}

/// One move or pause of the print head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolpathSegment {
    pub segment_type: ToolpathSegmentType,
    pub start: Point2D,
    pub end: Point2D,
    /// mm/min; zero for dwells
    pub feed_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell_ms: Option<u64>,
}

impl ToolpathSegment {
    /// Creates a new moving segment.
    pub fn new(segment_type: ToolpathSegmentType, start: Point2D, end: Point2D, feed_rate: f64) -> Self {
        Self {
            segment_type,
            start,
            end,
            feed_rate,
            dwell_ms: None,
        }
    }

    pub fn travel(start: Point2D, end: Point2D, feed_rate: f64) -> Self {
        Self::new(ToolpathSegmentType::Travel, start, end, feed_rate)
    }

    pub fn extrude(start: Point2D, end: Point2D, feed_rate: f64) -> Self {
        Self::new(ToolpathSegmentType::Extrude, start, end, feed_rate)
    }

    /// A pause of `ms` milliseconds at `at`.
    pub fn dwell(at: Point2D, ms: u64) -> Self {
        Self {
            segment_type: ToolpathSegmentType::Dwell,
            start: at,
            end: at,
            feed_rate: 0.0,
            dwell_ms: Some(ms),
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn is_extrude(&self) -> bool {
        self.segment_type == ToolpathSegmentType::Extrude
    }

    pub fn is_travel(&self) -> bool {
        self.segment_type == ToolpathSegmentType::Travel
    }
}
