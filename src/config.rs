use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::util::parse_hex_color;

pub const DEFAULT_EDGE_COLOR: &str = "#999999";
pub const DEFAULT_NODE_COLOR: &str = "#1f77b4";
const DEFAULT_EDGE_COLOR32: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);
const DEFAULT_NODE_COLOR32: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
const MAX_STAGE: u8 = 5;

/// How cached positions take part in a new layout run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RelayoutPolicy {
    /// A fully cached graph is shown as stored and never re-simulated.
    #[default]
    Frozen,
    /// Cached healthy nodes hold still while the rest of the graph settles.
    Incremental,
}

impl RelayoutPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::Incremental => "incremental",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub node_count: usize,
    pub stage: u8,
    pub edge_width: u32,
    pub edge_color: String,
    pub node_radius: u32,
    pub node_color: String,
    pub node_repulsion: f32,
    pub edge_attraction: f32,
    pub relayout: RelayoutPolicy,
    pub max_ticks: u32,
    pub abnormal_nodes: BTreeSet<usize>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            node_count: 500,
            stage: 0,
            edge_width: 1,
            edge_color: DEFAULT_EDGE_COLOR.to_owned(),
            node_radius: 5,
            node_color: DEFAULT_NODE_COLOR.to_owned(),
            node_repulsion: 100.0,
            edge_attraction: 50.0,
            relayout: RelayoutPolicy::Frozen,
            max_ticks: 300,
            abnormal_nodes: BTreeSet::new(),
        }
    }
}

impl ViewConfig {
    /// Reads a JSON config and clamps every value into its supported range.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config.clamped())
    }

    pub fn clamped(mut self) -> Self {
        self.stage = self.stage.min(MAX_STAGE);
        self.edge_width = self.edge_width.clamp(1, 10);
        self.node_radius = self.node_radius.clamp(1, 20);
        self.node_repulsion = clamp_finite(self.node_repulsion, 50.0, 500.0, 100.0);
        self.edge_attraction = clamp_finite(self.edge_attraction, 10.0, 100.0, 50.0);
        self.max_ticks = self.max_ticks.max(1);
        self.abnormal_nodes.retain(|id| *id < self.node_count);
        replace_invalid_color(&mut self.edge_color, DEFAULT_EDGE_COLOR, "edgeColor");
        replace_invalid_color(&mut self.node_color, DEFAULT_NODE_COLOR, "nodeColor");
        self
    }

    /// Called every frame; invalid strings were already replaced by `clamped`.
    pub fn edge_color32(&self) -> Color32 {
        parse_hex_color(&self.edge_color).unwrap_or(DEFAULT_EDGE_COLOR32)
    }

    pub fn node_color32(&self) -> Color32 {
        parse_hex_color(&self.node_color).unwrap_or(DEFAULT_NODE_COLOR32)
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Returns true when `value` was not a hex color and got replaced.
fn replace_invalid_color(value: &mut String, fallback: &str, key: &str) -> bool {
    if parse_hex_color(value).is_some() {
        return false;
    }
    tracing::warn!(key, value = value.as_str(), fallback, "invalid color, using default");
    *value = fallback.to_owned();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_keys_take_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("view.json");
        fs::write(&path, r#"{ "nodeCount": 40, "relayout": "incremental" }"#).expect("write");

        let config = ViewConfig::load(&path).expect("load config");
        assert_eq!(config.node_count, 40);
        assert_eq!(config.relayout, RelayoutPolicy::Incremental);
        assert_eq!(config.edge_color, DEFAULT_EDGE_COLOR);
        assert_eq!(config.max_ticks, 300);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("view.json");
        fs::write(
            &path,
            r#"{
                "nodeCount": 10,
                "stage": 9,
                "edgeWidth": 0,
                "nodeRadius": 64,
                "nodeRepulsion": 5000,
                "edgeAttraction": 1,
                "maxTicks": 0,
                "abnormalNodes": [2, 30]
            }"#,
        )
        .expect("write");

        let config = ViewConfig::load(&path).expect("load config");
        assert_eq!(config.stage, 5);
        assert_eq!(config.edge_width, 1);
        assert_eq!(config.node_radius, 20);
        assert_eq!(config.node_repulsion, 500.0);
        assert_eq!(config.edge_attraction, 10.0);
        assert_eq!(config.max_ticks, 1);
        assert_eq!(config.abnormal_nodes, BTreeSet::from([2]));
    }

    #[test]
    fn malformed_json_reports_the_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ nodeCount: ").expect("write");

        let error = ViewConfig::load(&path).expect_err("should fail");
        assert!(format!("{error:#}").contains("broken.json"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        assert!(ViewConfig::load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn invalid_colors_fall_back() {
        let config = ViewConfig {
            node_color: "teal-ish".to_owned(),
            edge_color: "#102030".to_owned(),
            ..ViewConfig::default()
        }
        .clamped();

        assert_eq!(config.node_color, DEFAULT_NODE_COLOR);
        assert_eq!(config.node_color32(), Color32::from_rgb(0x1f, 0x77, 0xb4));
        assert_eq!(config.edge_color32(), Color32::from_rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn invalid_color_is_replaced_once() {
        let mut color = "not a color".to_owned();
        assert!(replace_invalid_color(&mut color, DEFAULT_EDGE_COLOR, "edgeColor"));
        assert_eq!(color, DEFAULT_EDGE_COLOR);
        assert!(!replace_invalid_color(&mut color, DEFAULT_EDGE_COLOR, "edgeColor"));

        let config = ViewConfig {
            edge_color: "#zzz".to_owned(),
            ..ViewConfig::default()
        }
        .clamped();
        assert_eq!(config.clone().clamped(), config);
        assert_eq!(config.edge_color32(), DEFAULT_EDGE_COLOR32);
    }
}
