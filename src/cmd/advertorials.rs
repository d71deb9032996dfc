//! Advertorial commands: `advertorials generate`.

use anyhow::Result;
use console::style;
use std::time::Duration;

use super::super::AdvertorialCommands;
use super::AppContext;
use marketlens::generation::{
    AdvertorialOrchestrator, GenerationEvent, GenerationPhase, GenerationRequest, GenerationState,
    Slot,
};
use marketlens::ui::icons::{CROSS, PENDING, SPARKLE};
use marketlens::ui::render;

const PRINTER_DRAIN: Duration = Duration::from_secs(1);

pub async fn cmd_advertorials(ctx: &AppContext, command: AdvertorialCommands) -> Result<()> {
    match command {
        AdvertorialCommands::Generate {
            project_id,
            description,
        } => generate(ctx, GenerationRequest::new(project_id, description)).await,
    }
}

async fn generate(ctx: &AppContext, request: GenerationRequest) -> Result<()> {
    ctx.require_session()?;

    let orchestrator = AdvertorialOrchestrator::new(ctx.client.clone());
    let mut events = orchestrator.subscribe();
    let handle = orchestrator.submit(request).await?;

    let quiet = ctx.json;
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if quiet {
                continue;
            }
            match event {
                GenerationEvent::PhaseChanged { phase, .. } => {
                    println!("{}{}", PENDING, render::phase_label(phase));
                }
                GenerationEvent::SlotResolved { variant, ok, .. } => {
                    let mark = if ok { &SPARKLE } else { &CROSS };
                    println!("  {}{}", mark, variant.title());
                }
            }
        }
    });

    let state = tokio::select! {
        state = handle.finished() => state,
        _ = tokio::signal::ctrl_c() => {
            orchestrator.detach();
            printer.abort();
            anyhow::bail!("Interrupted; results still in flight were discarded");
        }
    };
    // Closing the channel lets the printer drain and stop.
    drop(orchestrator);
    let _ = tokio::time::timeout(PRINTER_DRAIN, printer).await;

    report(ctx, &state)
}

fn report(ctx: &AppContext, state: &GenerationState) -> Result<()> {
    if ctx.json {
        ctx.print_json(state)?;
    } else {
        println!();
        print!(
            "{}",
            render::generation_summary(state, render::terminal_width())
        );
    }

    if state.phase == GenerationPhase::Failed {
        return Err(match state.error.clone() {
            Some(e) => ctx.transport_failure(e),
            None => anyhow::anyhow!("Advertorial generation failed"),
        });
    }

    let rejected = [&state.set.story, &state.set.value, &state.set.info]
        .into_iter()
        .find_map(|slot| match slot {
            Slot::Failed(e) if e.is_unauthorized() => Some(e.clone()),
            _ => None,
        });
    if let Some(e) = rejected {
        return Err(ctx.transport_failure(e));
    }

    if !ctx.json {
        let loaded = [&state.set.story, &state.set.value, &state.set.info]
            .into_iter()
            .filter(|slot| slot.artifact().is_some())
            .count();
        println!();
        println!(
            "{} of 3 advertorials generated",
            style(loaded).bold()
        );
    }
    Ok(())
}
