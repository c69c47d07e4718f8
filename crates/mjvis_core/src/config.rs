//! Scene parser configuration.
//!
//! The defaults encode the robosuite scene conventions: visual geometry in
//! group 1, collision variants tagged `collision`, arena floor and walls
//! skipped, and `bin` containers treated as static.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Render group holding visual (non-collision) geometry
    pub visual_group: i32,
    /// Name substrings that drop a geom (floor, walls)
    pub excluded_markers: Vec<String>,
    /// Exact geom names never mirrored to the renderer
    pub deny_list: Vec<String>,
    /// Name substring identifying collision geometry
    pub collision_marker: String,
    /// Parent body substrings whose offset is folded into child positions
    pub container_markers: Vec<String>,
    /// Name substrings marking components that never move
    pub static_tags: Vec<String>,
    /// Inherit geom attributes from `<default>` classes
    pub resolve_defaults: bool,
    /// Overrides the document's own base directory for asset paths
    pub base_dir: Option<PathBuf>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            visual_group: 1,
            excluded_markers: vec!["floor".to_string(), "wall".to_string()],
            deny_list: vec![
                "VisualBread_g0".to_string(),
                "VisualCan_g0".to_string(),
                "VisualCereal_g0".to_string(),
                "VisualMilk_g0".to_string(),
            ],
            collision_marker: "collision".to_string(),
            container_markers: vec!["bin".to_string()],
            static_tags: vec!["bin".to_string()],
            resolve_defaults: true,
            base_dir: None,
        }
    }
}

fn contains_any(name: &str, tags: &[String]) -> bool {
    tags.iter().any(|tag| name.contains(tag.as_str()))
}

impl ParserConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Floor, wall and deny-listed names.
    pub fn is_excluded_name(&self, name: &str) -> bool {
        contains_any(name, &self.excluded_markers) || self.deny_list.iter().any(|d| d == name)
    }

    pub fn is_collision_name(&self, name: &str) -> bool {
        !self.collision_marker.is_empty() && name.contains(self.collision_marker.as_str())
    }

    pub fn is_container(&self, body_name: &str) -> bool {
        contains_any(body_name, &self.container_markers)
    }

    pub fn is_static(&self, name: &str) -> bool {
        contains_any(name, &self.static_tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let config = ParserConfig::default();
        assert!(config.is_excluded_name("floor"));
        assert!(config.is_excluded_name("left_wall_visual"));
        assert!(config.is_excluded_name("VisualCan_g0"));
        assert!(!config.is_excluded_name("VisualCan_g1"));
        assert!(config.is_collision_name("robot0_link1_collision"));
        assert!(config.is_container("bin1"));
        assert!(config.is_static("bin2_wall_left"));
        assert!(!config.is_static("cube_g0"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "visual_group": 2, "static_tags": ["table"] }"#;
        let config = ParserConfig::from_json_str(json).unwrap();
        assert_eq!(config.visual_group, 2);
        assert_eq!(config.static_tags, vec!["table".to_string()]);
        assert_eq!(config.collision_marker, "collision");
        assert!(config.resolve_defaults);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ParserConfig::from_json_str("{ visual_group: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_empty_collision_marker_matches_nothing() {
        let config = ParserConfig {
            collision_marker: String::new(),
            ..Default::default()
        };
        assert!(!config.is_collision_name("anything"));
    }
}
