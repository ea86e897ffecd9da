//! Editor tuning knobs.

use crate::error::DocumentResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Thresholds and limits used by the editor. Every field has a default, so a
/// partial JSON file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapshots kept per page.
    pub history_limit: usize,
    /// Extra slack when hit testing objects.
    pub hit_padding: f64,
    /// Grab radius of selection handles.
    pub handle_radius: f64,
    /// Distance of the rotation handle above the selection's top edge.
    pub rotate_handle_offset: f64,
    /// Marquees smaller than this in both axes count as a click.
    pub marquee_threshold: f64,
    /// Distance at which alignment guides appear.
    pub guide_threshold: f64,
    /// Smallest width/height of resized strokes and vector shapes.
    pub min_vector_size: f64,
    /// Smallest width/height of resized images and groups.
    pub min_box_size: f64,
    /// How long a deleted page can be restored, in milliseconds.
    pub restore_timeout_ms: u64,
    /// Offset applied to duplicated and pasted objects.
    pub duplicate_offset: f64,
    /// Angle step used when rotating or drawing lines with shift held.
    pub rotation_snap_degrees: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            hit_padding: 4.0,
            handle_radius: 8.0,
            rotate_handle_offset: 25.0,
            marquee_threshold: 4.0,
            guide_threshold: 6.0,
            min_vector_size: 4.0,
            min_box_size: 10.0,
            restore_timeout_ms: 5000,
            duplicate_offset: 10.0,
            rotation_snap_degrees: 15.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn restore_timeout(&self) -> Duration {
        Duration::from_millis(self.restore_timeout_ms)
    }

    pub fn rotation_snap(&self) -> f64 {
        self.rotation_snap_degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "history_limit": 10 }"#).unwrap();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.marquee_threshold, 4.0);
        assert_eq!(config.restore_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "min_box_size": 12.5, "guide_threshold": 3 }}"#).unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.min_box_size, 12.5);
        assert_eq!(config.guide_threshold, 3.0);
        assert_eq!(config.min_vector_size, 4.0);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(EditorConfig::from_json("{ nope").is_err());
    }
}
