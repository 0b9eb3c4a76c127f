//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;

use super::args::{
    AddArgs, GraphArgs, InfoArgs, InitArgs, ListArgs, LoginArgs, MoveArgs, RecordFields,
    RemoveArgs, ShowArgs, UpdateArgs,
};
use crate::app::App;
use crate::domain::{
    Department, DepartmentId, Dependency, Entity, EntityId, EntityKind, EntityRef, NewDepartment,
    NewDependency, NewTask, NewUser, Task, TaskId, User,
};
use crate::draft::{department_choices, task_choices, to_task_choices, Choice, DraftEdits};
use crate::error::Error;
use crate::output::{self, OutputConfig, OutputMode};
use crate::store::Store;
use tracing::warn;

/// Execute the init command
pub async fn execute_init(args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    use crate::config::{init, InitOptions};

    let current_dir = std::env::current_dir()?;
    let quiet = args.quiet || output_mode == OutputMode::Json;

    if !quiet {
        println!(
            "Initializing cddm repository{}...",
            if args.sample { " with sample data" } else { "" }
        );
    }

    let result = init(
        &current_dir,
        InitOptions {
            company_name: args.company.as_deref(),
            sample: args.sample,
        },
    )
    .await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "cddm_dir": result.cddm_dir.display().to_string(),
                "company_name": result.company_name,
                "records": result.records,
            }))?;
        }
        OutputMode::Text if !args.quiet => {
            println!("Initialized cddm in {}", result.cddm_dir.display());
            println!("  Config:  {}", result.config_file.display());
            println!("  Data:    {}", result.data_file.display());
            println!("  Company: {}", result.company_name);
            println!("  Records: {}", result.records);
        }
        OutputMode::Text => {}
    }

    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &App, _args: &InfoArgs, output_mode: OutputMode) -> Result<()> {
    let store = app.workspace().store();
    let warnings: Vec<String> = app.warnings().iter().map(ToString::to_string).collect();

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "company_name": app.config().company_name,
                "cddm_dir": app.cddm_dir().display().to_string(),
                "backend": app.backend_description(),
                "records": {
                    "departments": store.departments().len(),
                    "users": store.users().len(),
                    "tasks": store.tasks().len(),
                    "dependencies": store.dependencies().len(),
                },
                "warnings": warnings,
                "dropped_records": app.dropped_records(),
            }))?;
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!("{}", app.config().company_name);
            println!("==============================");
            println!();
            println!("Directory:    {}", app.cddm_dir().display());
            println!("Storage:      {}", app.backend_description());
            println!();
            println!(
                "Records: {} departments, {} users, {} tasks, {} dependencies",
                store.departments().len(),
                store.users().len(),
                store.tasks().len(),
                store.dependencies().len()
            );
            if !warnings.is_empty() {
                println!();
                println!("{}", output::warning("Load warnings:", &config));
                for w in &warnings {
                    println!("  {w}");
                }
            }
            let dropped = app.dropped_records();
            if dropped > 0 {
                println!();
                println!(
                    "{}",
                    output::error(
                        &format!(
                            "{dropped} skipped record(s) are still in the data file; \
                             commands that write are refused until they are fixed"
                        ),
                        &config
                    )
                );
            }
        }
    }

    Ok(())
}

/// Execute the login command
pub async fn execute_login(args: &LoginArgs, output_mode: OutputMode) -> Result<()> {
    use crate::auth::{sign_in, Credentials, SIGN_IN_DELAY};

    let credentials = Credentials::new(&args.username, &args.password);
    if output_mode == OutputMode::Text {
        output::print_message("Signing in...")?;
    }

    let session = sign_in(&credentials, SIGN_IN_DELAY).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&session)?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!(
                "{} {}",
                output::success("Signed in as", &config),
                session.display_name
            );
        }
    }
    Ok(())
}

/// Execute the add command
pub async fn execute_add(app: &mut App, args: &AddArgs, output_mode: OutputMode) -> Result<()> {
    let kind = EntityKind::from(args.kind);
    check_fields(kind, &args.fields)?;
    let f = &args.fields;

    let workspace = app.workspace_mut();
    let target = match kind {
        EntityKind::Department => workspace
            .add::<Department>(NewDepartment {
                name: f.name.clone(),
            })?
            .to_ref(),
        EntityKind::User => workspace
            .add::<User>(NewUser {
                name: f.name.clone(),
                department_id: f.department.map(DepartmentId),
            })?
            .to_ref(),
        EntityKind::Task => workspace
            .add::<Task>(NewTask {
                name: f.name.clone(),
                department_id: f.department.map(DepartmentId),
            })?
            .to_ref(),
        EntityKind::Dependency => workspace
            .add::<Dependency>(NewDependency {
                from_task_id: f.from.map(TaskId),
                to_task_id: f.to.map(TaskId),
                link_type: f.link.map(Into::into),
            })?
            .to_ref(),
    };
    warn_unresolved(app.workspace().store(), f);
    app.save().await?;

    report_entity(app.workspace().store(), target, "Added", output_mode)
}

/// Execute the list command
pub async fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let kinds: Vec<EntityKind> = match args.kind {
        Some(kind) => vec![kind.into()],
        None => EntityKind::ALL.to_vec(),
    };
    output::print_records(app.workspace().store(), &kinds, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let store = app.workspace().store();
    let target = EntityRef::new(args.kind.into(), args.id);
    let entity = store
        .entity(target)
        .ok_or_else(|| Error::not_found(target.kind(), target.raw_id()))?;

    output::print_entity(store, &entity, output_mode)?;
    Ok(())
}

/// Execute the update command
pub async fn execute_update(
    app: &mut App,
    args: &UpdateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let edits = to_edits(&args.fields);
    if edits.is_empty() {
        anyhow::bail!("No updates specified. Use --help to see available options.");
    }

    let target = EntityRef::new(args.kind.into(), args.id);
    let workspace = app.workspace_mut();
    let mut draft = workspace.draft(target)?;
    draft.apply(edits)?;
    workspace.commit(draft)?;
    warn_unresolved(app.workspace().store(), &args.fields);
    app.save().await?;

    report_entity(app.workspace().store(), target, "Updated", output_mode)
}

/// Execute the remove command
pub async fn execute_remove(
    app: &mut App,
    args: &RemoveArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let target = EntityRef::new(args.kind.into(), args.id);
    let removed = app.workspace_mut().remove_entity(target)?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "removed": removed,
                "status": "success"
            }))?;
        }
        OutputMode::Text => {
            output::print_message(&format!("Removed {target}"))?;
        }
    }
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &mut App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    use crate::render::svg::render_svg;

    if let Some(raw) = args.select {
        let task = TaskId(raw);
        if !app.workspace().store().contains(task) {
            return Err(Error::not_found(EntityKind::Task, raw).into());
        }
        app.workspace_mut().select(Some(task));
    }

    let workspace = app.workspace();
    let scene = workspace.scene();

    match &args.output {
        Some(path) => {
            let svg = render_svg(&scene, workspace.palette(), &app.config().company_name);
            tokio::fs::write(path, svg).await?;
            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "output": path.display().to_string(),
                    "nodes": scene.nodes.len(),
                    "edges": scene.edges.len(),
                }))?,
                OutputMode::Text => {
                    output::print_message(&format!("Wrote graph to {}", path.display()))?
                }
            }
        }
        None => output::print_scene(&scene, output_mode)?,
    }
    Ok(())
}

/// Execute the move command
pub async fn execute_move(app: &mut App, args: &MoveArgs, output_mode: OutputMode) -> Result<()> {
    let task = TaskId(args.task);
    app.workspace_mut().move_task(task, args.x, args.y)?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "task": task,
                "x": args.x,
                "y": args.y,
            }))?;
        }
        OutputMode::Text => {
            output::print_message(&format!("Moved task {task} to ({}, {})", args.x, args.y))?;
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn to_edits(fields: &RecordFields) -> DraftEdits {
    DraftEdits {
        name: fields.name.clone(),
        department_id: fields.department.map(DepartmentId),
        from_task_id: fields.from.map(TaskId),
        to_task_id: fields.to.map(TaskId),
        link_type: fields.link.map(Into::into),
    }
}

/// Reject flags that `kind` has no field for.
fn check_fields(kind: EntityKind, fields: &RecordFields) -> Result<()> {
    let mut flags = vec![
        ("--from", fields.from.is_some()),
        ("--to", fields.to.is_some()),
        ("--link", fields.link.is_some()),
    ];
    match kind {
        EntityKind::Department => flags.push(("--department", fields.department.is_some())),
        EntityKind::User | EntityKind::Task => {}
        EntityKind::Dependency => {
            flags = vec![
                ("--name", fields.name.is_some()),
                ("--department", fields.department.is_some()),
            ];
        }
    }

    match flags.iter().find(|(_, set)| *set) {
        Some((flag, _)) => anyhow::bail!("{flag} cannot be used with a {kind}"),
        None => Ok(()),
    }
}

/// Log references given on the command line that resolve to nothing,
/// with the ids that would.
fn warn_unresolved(store: &Store, fields: &RecordFields) {
    if let Some(raw) = fields.department
        && !store.contains(DepartmentId(raw))
    {
        warn!(
            department = raw,
            choices = %format_choices(&department_choices(store)),
            "Department does not exist; it shows as '—' until it does"
        );
    }
    if let Some(raw) = fields.from
        && !store.contains(TaskId(raw))
    {
        warn!(
            task = raw,
            choices = %format_choices(&task_choices(store)),
            "Source task does not exist"
        );
    }
    if let Some(raw) = fields.to
        && !store.contains(TaskId(raw))
    {
        let choices = match fields.from {
            Some(from) => to_task_choices(store, TaskId(from)),
            None => task_choices(store),
        };
        warn!(
            task = raw,
            choices = %format_choices(&choices),
            "Target task does not exist"
        );
    }
}

fn format_choices(choices: &[Choice]) -> String {
    if choices.is_empty() {
        return "none".to_string();
    }
    choices
        .iter()
        .map(|c| format!("{} ({})", c.id, c.label))
        .collect::<Vec<_>>()
        .join(", ")
}

fn report_entity(
    store: &Store,
    target: EntityRef,
    verb: &str,
    output_mode: OutputMode,
) -> Result<()> {
    let entity = store
        .entity(target)
        .ok_or_else(|| Error::not_found(target.kind(), target.raw_id()))?;

    match output_mode {
        OutputMode::Json => output::print_json(&entity)?,
        OutputMode::Text => {
            let label = match &entity {
                Entity::Department(d) => d.name.clone(),
                Entity::User(u) => u.name.clone(),
                Entity::Task(t) => t.name.clone(),
                Entity::Dependency(d) => format!(
                    "{} → {} ({})",
                    store.task_name(d.from_task_id),
                    store.task_name(d.to_task_id),
                    d.link_type
                ),
            };
            output::print_message(&format!("{verb} {target}: {label}"))?;
        }
    }
    Ok(())
}
