//! Research commands: `research list|show|delete|analyze`.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use super::super::ResearchCommands;
use super::AppContext;
use marketlens::ApiClient;
use marketlens::models::RecordId;
use marketlens::research::{ListViewError, ResearchListView};
use marketlens::transport::AnalysisBackend;
use marketlens::ui::icons::{CHECK, SEARCH, TRASH, WARN};
use marketlens::ui::render;

pub async fn cmd_research(ctx: &AppContext, command: ResearchCommands) -> Result<()> {
    ctx.require_session()?;
    let mut view = ResearchListView::new(ctx.client.clone());

    match command {
        ResearchCommands::List => {
            load(ctx, &mut view).await?;
            let snapshot = view.snapshot().research;
            if ctx.json {
                return ctx.print_json(&snapshot.records);
            }
            print!("{}", render::research_list(&snapshot));
        }
        ResearchCommands::Show { id } => {
            load(ctx, &mut view).await?;
            let id = RecordId::from(id);
            let Some(record) = view.cache().get(&id) else {
                anyhow::bail!("Research '{}' not found", id);
            };
            if ctx.json {
                return ctx.print_json(record);
            }
            print!("{}", render::research_detail(record, render::terminal_width()));
        }
        ResearchCommands::Delete { id, yes } => {
            load(ctx, &mut view).await?;
            let id = RecordId::from(id);
            let name = match view.cache().get(&id) {
                Some(record) => record.name.clone(),
                None => anyhow::bail!("Research '{}' not found", id),
            };

            view.request_delete(id.clone())?;
            if !yes {
                let confirm = Confirm::new()
                    .with_prompt(format!("Delete research '{}'?", name))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirm {
                    view.cancel_delete()?;
                    if !ctx.json {
                        println!("Deletion cancelled.");
                    }
                    return Ok(());
                }
            }

            match view.confirm_delete().await {
                Ok(deleted) => {
                    if ctx.json {
                        return ctx.print_json(&view.snapshot());
                    }
                    println!("{}{}Deleted research '{}'", CHECK, TRASH, deleted);
                    let remaining = view.cache().records().len();
                    println!("{} research record(s) remaining", remaining);
                }
                Err(ListViewError::Remove(e)) if e.deleted() => {
                    let reload = e.into_transport();
                    if ctx.json {
                        ctx.print_json(&view.snapshot())?;
                    } else {
                        println!("{}{}Deleted research '{}'", CHECK, TRASH, id);
                        println!(
                            "{}{} Deleted '{}', but could not reload the list: {}",
                            WARN,
                            style("Warning:").yellow(),
                            id,
                            reload.message
                        );
                    }
                    if reload.is_unauthorized() {
                        return Err(ctx.transport_failure(reload));
                    }
                }
                Err(ListViewError::Remove(e)) => {
                    return Err(ctx.transport_failure(e.into_transport()));
                }
                Err(ListViewError::Transport(e)) => return Err(ctx.transport_failure(e)),
                Err(e) => return Err(e.into()),
            }
        }
        ResearchCommands::Analyze { url } => {
            analyze(ctx, &mut view, &url).await?;
        }
    }

    Ok(())
}

async fn load(ctx: &AppContext, view: &mut ResearchListView<ApiClient>) -> Result<()> {
    view.refresh().await.map_err(|e| ctx.transport_failure(e))
}

async fn analyze(
    ctx: &AppContext,
    view: &mut ResearchListView<ApiClient>,
    url: &str,
) -> Result<()> {
    if !ctx.json {
        println!("{}Analyzing {} ...", SEARCH, style(url).underlined());
    }
    let analysis = ctx
        .client
        .analyze_url(url)
        .await
        .map_err(|e| ctx.transport_failure(e))?;

    // New research shows up in the list; a failed reload is only a warning.
    let refreshed = view.refresh().await;

    if ctx.json {
        return ctx.print_json(&analysis);
    }
    println!("{}Analysis complete", CHECK);
    let pretty = serde_json::to_string_pretty(&analysis.result)
        .unwrap_or_else(|_| analysis.result.to_string());
    println!("{}", pretty);
    match refreshed {
        Ok(()) => println!("{} research record(s) stored", view.cache().records().len()),
        Err(e) => println!(
            "{}{} could not reload research list: {}",
            WARN,
            style("Warning:").yellow(),
            e
        ),
    }
    Ok(())
}
