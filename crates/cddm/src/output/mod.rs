//! Output formatting for CLI commands.
//!
//! Every printer has a text form for people and a JSON form for scripts.
//! Text printers write to any `Write` so they can be tested against a
//! buffer; the public dispatch functions lock stdout.

pub mod color;

use crate::domain::{Entity, EntityKind};
use crate::render::Scene;
use crate::store::Store;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{bold, colorize_id, colorize_link, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `CDDM_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("CDDM_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);
        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print the records of `kinds`, grouped by kind.
pub fn print_records(store: &Store, kinds: &[EntityKind], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_records_text(&mut handle, store, kinds, &OutputConfig::from_env()),
        OutputMode::Json => {
            let mut map = serde_json::Map::new();
            for kind in kinds {
                let rows = records_json(store, *kind)?;
                map.insert(collection_name(*kind).to_string(), rows);
            }
            write_json(&mut handle, &map)
        }
    }
}

/// Print one record with resolved references.
pub fn print_entity(store: &Store, entity: &Entity, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_entity_text(&mut handle, store, entity, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, entity),
    }
}

/// Print a derived graph scene.
pub fn print_scene(scene: &Scene, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_scene_text(&mut handle, scene, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, scene),
    }
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

fn records_json(store: &Store, kind: EntityKind) -> io::Result<serde_json::Value> {
    let value = match kind {
        EntityKind::Department => serde_json::to_value(store.departments()),
        EntityKind::User => serde_json::to_value(store.users()),
        EntityKind::Task => serde_json::to_value(store.tasks()),
        EntityKind::Dependency => serde_json::to_value(store.dependencies()),
    };
    value.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn collection_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Department => "departments",
        EntityKind::User => "users",
        EntityKind::Task => "tasks",
        EntityKind::Dependency => "dependencies",
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_records_text<W: Write>(
    w: &mut W,
    store: &Store,
    kinds: &[EntityKind],
    config: &OutputConfig,
) -> io::Result<()> {
    for (i, kind) in kinds.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        let name = collection_name(*kind);
        match kind {
            EntityKind::Department => {
                writeln!(w, "{} ({}):", bold(name, config), store.departments().len())?;
                for d in store.departments() {
                    writeln!(
                        w,
                        "  {} {}  {} {}",
                        colorize_id(d.id.0, config),
                        d.name,
                        dimmed("members:", config),
                        store.member_names(d.id)
                    )?;
                }
            }
            EntityKind::User => {
                writeln!(w, "{} ({}):", bold(name, config), store.users().len())?;
                for u in store.users() {
                    writeln!(
                        w,
                        "  {} {}  {} {}",
                        colorize_id(u.id.0, config),
                        u.name,
                        dimmed("department:", config),
                        store.department_name(u.department_id)
                    )?;
                }
            }
            EntityKind::Task => {
                writeln!(w, "{} ({}):", bold(name, config), store.tasks().len())?;
                for t in store.tasks() {
                    writeln!(
                        w,
                        "  {} {}  {} {}",
                        colorize_id(t.id.0, config),
                        t.name,
                        dimmed("department:", config),
                        store.department_name(t.department_id)
                    )?;
                }
            }
            EntityKind::Dependency => {
                writeln!(w, "{} ({}):", bold(name, config), store.dependencies().len())?;
                for d in store.dependencies() {
                    writeln!(
                        w,
                        "  {} {} → {}  {}",
                        colorize_id(d.id.0, config),
                        store.task_name(d.from_task_id),
                        store.task_name(d.to_task_id),
                        colorize_link(d.link_type, config)
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn write_entity_text<W: Write>(
    w: &mut W,
    store: &Store,
    entity: &Entity,
    config: &OutputConfig,
) -> io::Result<()> {
    let target = entity.entity_ref();
    writeln!(
        w,
        "{} {}",
        bold(&target.kind().to_string(), config),
        colorize_id(target.raw_id(), config)
    )?;

    match entity {
        Entity::Department(d) => {
            writeln!(w, "  {} {}", dimmed("Name:", config), d.name)?;
            writeln!(w, "  {} {}", dimmed("Members:", config), store.member_names(d.id))?;
        }
        Entity::User(u) => {
            writeln!(w, "  {} {}", dimmed("Name:", config), u.name)?;
            writeln!(
                w,
                "  {} {}",
                dimmed("Department:", config),
                store.department_name(u.department_id)
            )?;
        }
        Entity::Task(t) => {
            writeln!(w, "  {} {}", dimmed("Name:", config), t.name)?;
            writeln!(
                w,
                "  {} {}",
                dimmed("Department:", config),
                store.department_name(t.department_id)
            )?;
            let deps = store.dependencies_of_task(t.id);
            if !deps.is_empty() {
                writeln!(w, "  {}", dimmed("Dependencies:", config))?;
                for d in deps {
                    let (arrow, other) = if d.from_task_id == t.id {
                        ("→", d.to_task_id)
                    } else {
                        ("←", d.from_task_id)
                    };
                    writeln!(
                        w,
                        "    {arrow} {} {}",
                        colorize_link(d.link_type, config),
                        store.task_name(other)
                    )?;
                }
            }
        }
        Entity::Dependency(d) => {
            writeln!(w, "  {} {}", dimmed("From:", config), store.task_name(d.from_task_id))?;
            writeln!(w, "  {} {}", dimmed("To:", config), store.task_name(d.to_task_id))?;
            writeln!(w, "  {} {}", dimmed("Link:", config), colorize_link(d.link_type, config))?;
        }
    }
    Ok(())
}

fn write_scene_text<W: Write>(w: &mut W, scene: &Scene, config: &OutputConfig) -> io::Result<()> {
    if scene.is_empty {
        return writeln!(w, "{}", dimmed("No tasks yet. Add some from the admin commands.", config));
    }

    writeln!(w, "{} ({}):", bold("Nodes", config), scene.nodes.len())?;
    for node in &scene.nodes {
        let subtitle = node.subtitle.as_deref().unwrap_or("");
        writeln!(
            w,
            "  {} {:<10} {:<8} ({:.0}, {:.0})  {:?}",
            colorize_id(node.task_id.0, config),
            node.label,
            subtitle,
            node.x,
            node.y,
            node.emphasis
        )?;
    }

    writeln!(w)?;
    writeln!(w, "{} ({}):", bold("Dependencies", config), scene.dependency_rows.len())?;
    for row in &scene.dependency_rows {
        let line = format!("{} → {}", row.from_label, row.to_label);
        writeln!(
            w,
            "  {} {}  {}{}",
            colorize_id(row.dependency_id.0, config),
            line,
            colorize_link(row.link_type, config),
            if row.dangling {
                dimmed("  (dangling)", config)
            } else {
                String::new()
            }
        )?;
    }

    if let Some(selection) = &scene.selection {
        writeln!(w)?;
        writeln!(w, "{} {}", bold("Selected:", config), selection.name)?;
        writeln!(w, "  {} {}", dimmed("Department:", config), selection.department)?;
        for link in &selection.links {
            writeln!(
                w,
                "  {} {} {}",
                link.direction.arrow(),
                colorize_link(link.link_type, config),
                link.other_label
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, DepartmentId, TaskId};
    use crate::workspace::Workspace;

    fn plain() -> OutputConfig {
        OutputConfig { use_colors: false }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_records_text_resolves_names() {
        let (store, _) = Store::load(Dataset::sample());
        let out = render(|w| write_records_text(w, &store, &EntityKind::ALL, &plain()));

        assert!(out.contains("departments (2):"));
        assert!(out.contains("#1 Dept 1  members: User 1"));
        assert!(out.contains("#2 Task 2  department: Dept 2"));
        assert!(out.contains("#1 Task 1 → Task 2  blocks"));
    }

    #[test]
    fn test_entity_text_shows_sentinel_department() {
        let (mut store, _) = Store::load(Dataset::sample());
        store.remove(DepartmentId(1)).unwrap();
        let task = store.entity(crate::domain::EntityRef::Task(TaskId(1))).unwrap();

        let out = render(|w| write_entity_text(w, &store, &task, &plain()));

        assert!(out.contains("Department: —"));
        assert!(out.contains("→ blocks Task 2"));
    }

    #[test]
    fn test_scene_text_lists_selection() {
        let mut ws = Workspace::new(Store::load(Dataset::sample()).0);
        ws.select(Some(TaskId(2)));

        let out = render(|w| write_scene_text(w, &ws.scene(), &plain()));

        assert!(out.contains("Selected: Task 2"));
        assert!(out.contains("← blocks Task 1"));
    }

    #[test]
    fn test_empty_scene_text() {
        let ws = Workspace::new(Store::new());
        let out = render(|w| write_scene_text(w, &ws.scene(), &plain()));
        assert!(out.starts_with("No tasks yet"));
    }

    #[test]
    fn test_json_is_pretty_with_newline() {
        let out = render(|w| write_json(w, &serde_json::json!({"a": 1})));
        assert_eq!(out, "{\n  \"a\": 1\n}\n");
    }
}
