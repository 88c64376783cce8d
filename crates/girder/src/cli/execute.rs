//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;

use super::{AddArgs, ClearArgs, FilterAction, FilterArgs, InitArgs, InspectArgs, RecentArgs};
use crate::app::App;
use crate::domain::{UserHistoryItem, UserKey};
use crate::filter::UserFilter;
use crate::import;
use crate::output::{self, OutputMode};
use std::collections::BTreeSet;

/// Execute the init command
pub async fn execute_init(args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    let result = init::init(&current_dir, args.max_items).await?;

    if args.quiet {
        return Ok(());
    }

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "girder_dir": result.girder_dir.display().to_string(),
                "config_file": result.config_file.display().to_string(),
                "history_file": result.history_file.display().to_string(),
                "filters_file": result.filters_file.display().to_string(),
                "default_max_items": result.default_max_items,
            }))?;
        }
        OutputMode::Text => {
            println!("Initialized girder in {}", result.girder_dir.display());
            println!("  Config:  {}", result.config_file.display());
            println!("  History: {}", result.history_file.display());
            println!("  Filters: {}", result.filters_file.display());
            println!("  Default cap: {} items per category", result.default_max_items);
        }
    }

    Ok(())
}

/// Execute the add command
pub async fn execute_add(app: &mut App, args: &AddArgs, output_mode: OutputMode) -> Result<()> {
    let user = UserKey::from(args.user.as_str());
    let item = match &args.data {
        Some(data) => UserHistoryItem::with_data(args.category, &args.entity_id, data),
        None => UserHistoryItem::new(args.category, &args.entity_id),
    };

    app.history_mut().add(&user, item).await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "user": args.user,
                "category": args.category.as_str(),
                "entity_id": args.entity_id,
            }))?;
        }
        OutputMode::Text => {
            output::print_message(&format!(
                "Recorded {} '{}' for {}",
                args.category, args.entity_id, args.user
            ))?;
        }
    }

    Ok(())
}

/// Execute the recent command
pub async fn execute_recent(app: &App, args: &RecentArgs, output_mode: OutputMode) -> Result<()> {
    let user = UserKey::from(args.user.as_str());

    let mut items = app.history().get(&user, args.category).await;
    if let Some(limit) = args.limit {
        items.truncate(limit);
    }

    output::print_history_items(args.category, &items, output_mode)?;
    Ok(())
}

/// Execute the clear command
pub async fn execute_clear(app: &mut App, args: &ClearArgs, output_mode: OutputMode) -> Result<()> {
    let user = UserKey::from(args.user.as_str());

    let cleared = app.history_mut().remove_user(&user).await?;

    output::print_cleared_categories(&cleared, output_mode)?;
    Ok(())
}

/// Execute the filter command
pub async fn execute_filter(app: &mut App, args: &FilterArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        FilterAction::Set {
            field_id,
            groups,
            roles,
            disabled,
        } => {
            let groups: BTreeSet<String> = groups.iter().cloned().collect();
            let roles: BTreeSet<u64> = roles.iter().copied().collect();
            let filter = if *disabled {
                UserFilter {
                    enabled: false,
                    groups,
                    roles,
                }
            } else {
                UserFilter::enabled(groups, roles)
            };

            // Group names need a live group registry to check; the CLI has
            // none, so only the role ids are validated here.
            let errors = filter.validate_roles();
            if errors.has_any_errors() {
                output::print_error_collection(&errors, output_mode)?;
                anyhow::bail!("invalid filter for field '{field_id}'");
            }

            app.filters_mut().set(field_id.clone(), filter).await?;
            match output_mode {
                OutputMode::Json => {
                    output::print_json(&app.filters().get(field_id))?;
                }
                OutputMode::Text => {
                    output::print_message(&format!("Stored filter for '{field_id}'"))?;
                }
            }
        }
        FilterAction::Show { field_id } => {
            let filter = app.filters().get(field_id);
            match output_mode {
                OutputMode::Json => output::print_json(&filter)?,
                OutputMode::Text => print_filter_text(field_id, &filter)?,
            }
        }
        FilterAction::List => {
            let entries: Vec<(String, UserFilter)> = app
                .filters()
                .iter()
                .map(|(id, f)| (id.to_string(), f.clone()))
                .collect();
            match output_mode {
                OutputMode::Json => output::print_json(&entries)?,
                OutputMode::Text => {
                    if entries.is_empty() {
                        output::print_message("No filters stored")?;
                    }
                    for (field_id, filter) in &entries {
                        print_filter_text(field_id, filter)?;
                    }
                }
            }
        }
        FilterAction::Remove { field_id } => {
            let removed = app.filters_mut().remove(field_id).await?;
            match output_mode {
                OutputMode::Json => {
                    output::print_json(&serde_json::json!({
                        "field_id": field_id,
                        "removed": removed,
                    }))?;
                }
                OutputMode::Text => {
                    if removed {
                        output::print_message(&format!("Removed filter for '{field_id}'"))?;
                    } else {
                        output::print_message(&format!("No filter stored for '{field_id}'"))?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_filter_text(field_id: &str, filter: &UserFilter) -> std::io::Result<()> {
    if filter.is_unrestricted() {
        return output::print_message(&format!("{field_id}: unrestricted"));
    }

    let groups: Vec<&str> = filter.groups.iter().map(String::as_str).collect();
    let roles: Vec<String> = filter.roles.iter().map(u64::to_string).collect();
    output::print_message(&format!(
        "{field_id}: groups [{}], roles [{}]",
        groups.join(", "),
        roles.join(", ")
    ))
}

/// Execute the inspect command
pub async fn execute_inspect(args: &InspectArgs, output_mode: OutputMode) -> Result<()> {
    match import::load_backup_overview(&args.path).await {
        Ok(overview) => {
            output::print_backup_overview(&overview, output_mode)?;
            Ok(())
        }
        Err(errors) => {
            output::print_error_collection(&errors, output_mode)?;
            anyhow::bail!("backup file could not be inspected")
        }
    }
}
