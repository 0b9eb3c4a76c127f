//! Colours and emphasis values used by the render model.

use crate::domain::LinkType;
use serde::{Deserialize, Serialize};

/// Colour scheme for the graph canvas.
///
/// Department colours are assigned by the department's ordinal and wrap
/// around when there are more departments than colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Palette {
    /// Cycle of department colours, by department ordinal
    pub department_colors: Vec<String>,
    /// Colour of a task whose department is missing
    pub fallback_color: String,
    /// `blocks` links
    pub blocks_color: String,
    /// `requires` links
    pub requires_color: String,
    /// `related` links
    pub related_color: String,
    /// Fill of an unselected node
    pub node_fill: String,
    /// Label on a selected node
    pub selected_text: String,
    /// Subtitle on a selected node
    pub selected_subtitle: String,
    /// Subtitle on any other node
    pub muted_text: String,
    /// Canvas background
    pub background: String,
    /// Dot grid over the background
    pub grid_dot: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            department_colors: ["#4a90d9", "#5bb87a", "#d9924a", "#9b59b6", "#e74c3c", "#1abc9c"]
                .into_iter()
                .map(String::from)
                .collect(),
            fallback_color: "#5a5a6a".to_string(),
            blocks_color: "#d9534f".to_string(),
            requires_color: "#f0ad4e".to_string(),
            related_color: "#5a5a6a".to_string(),
            node_fill: "#2e2e38".to_string(),
            selected_text: "#fff".to_string(),
            selected_subtitle: "rgba(255,255,255,0.7)".to_string(),
            muted_text: "#8a8a9a".to_string(),
            background: "#1e1e26".to_string(),
            grid_dot: "#3a3a48".to_string(),
        }
    }
}

impl Palette {
    /// Colour for a department ordinal; `None` gives the fallback.
    pub fn department_color(&self, index: Option<usize>) -> &str {
        index
            .filter(|_| !self.department_colors.is_empty())
            .and_then(|i| self.department_colors.get(i % self.department_colors.len()))
            .map_or(self.fallback_color.as_str(), String::as_str)
    }

    /// Stroke colour of a link type.
    pub fn link_color(&self, link: LinkType) -> &str {
        match link {
            LinkType::Blocks => &self.blocks_color,
            LinkType::Requires => &self.requires_color,
            LinkType::Related => &self.related_color,
        }
    }
}

/// Dash pattern of a link type, if it is drawn dashed.
pub fn link_dash(link: LinkType) -> Option<&'static str> {
    match link {
        LinkType::Related => Some("5 4"),
        LinkType::Blocks | LinkType::Requires => None,
    }
}
