//! Editor configuration supplied by the host page.
//!
//! Every field has a default, so the host may pass a partial JSON object
//! (or nothing at all).

use crate::error::ConfigError;
use crate::model::{DEFAULT_IMAGE_FLOOR, Point};
use serde::{Deserialize, Serialize};

/// Visible canvas area, used to place newly added shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Top-left for a newly added shape: centre offset by (−50, −25).
    pub fn new_shape_position(&self) -> Point {
        self.center() - Point::new(50.0, 25.0)
    }
}

/// Tunables for the interaction engine, hit testing and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub viewport: Viewport,

    /// Displacement on either axis a press must exceed before it becomes a
    /// drag. Default: **5**.
    pub drag_threshold: f32,

    /// Floor for image width/height during resize. Default: **10**.
    pub min_image_size: f32,

    /// Grab radius of line endpoint and image corner handles. Default: **5**.
    pub handle_radius: f32,

    /// Distance from a line's segment that still counts as a hit. Default: **4**.
    pub line_hit_tolerance: f32,

    /// Suggested file name for saved layouts.
    pub save_file_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            drag_threshold: 5.0,
            min_image_size: DEFAULT_IMAGE_FLOOR,
            handle_radius: 5.0,
            line_hit_tolerance: 4.0,
            save_file_name: "layout.json".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config object.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
