//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:  green   (completed actions)
//!   - Warning:  yellow  (load warnings, `requires` links)
//!   - Error:    red     (failures, `blocks` links)
//!   - Info:     cyan    (record ids)
//!   - Muted:    dimmed  (field labels, sentinels, `related` links)
//!   - Emphasis: bold    (section headers, the selected task)

use crate::domain::LinkType;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Colorize a record id as `#id` (cyan).
pub(crate) fn colorize_id(id: u64, config: &OutputConfig) -> String {
    info(&format!("#{id}"), config)
}

/// Color a link type the way the graph draws it.
pub(crate) fn colorize_link(link: LinkType, config: &OutputConfig) -> String {
    let text = link.as_str();
    match link {
        LinkType::Blocks => error(text, config),
        LinkType::Requires => warning(text, config),
        LinkType::Related => dimmed(text, config),
    }
}
