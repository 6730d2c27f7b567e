//! Scan and schedule command handlers.

use chrono::NaiveDateTime;
use tabled::Tabled;

use lanwarden_core::PlannedScan;

use crate::cli::{GlobalOpts, ScanArgs, ScanCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ScheduleRow {
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Interval (min)")]
    interval: i64,
    #[tabled(rename = "Next Scan")]
    next_scan: String,
    #[tabled(rename = "Last Scan")]
    last_scan: String,
}

impl From<&PlannedScan> for ScheduleRow {
    fn from(p: &PlannedScan) -> Self {
        Self {
            target: p.target.clone(),
            interval: p.interval,
            next_scan: if p.is_paused() {
                "paused".into()
            } else {
                fmt_time(p.next_scan_at)
            },
            last_scan: fmt_time(p.last_scan_at),
        }
    }
}

fn fmt_time(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: ScanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ScanCommand::Start { target } => {
            match target {
                Some(ref t) => ctx.lists.start_scan(t).await?,
                // No target: the backend scans its configured default range.
                None => ctx.board.start_adhoc(None).await?,
            }
            output::print_output("Scan started", global.quiet);
            Ok(())
        }

        ScanCommand::Plan { interval, target } => {
            ctx.board.plan_scan(interval, &target).await?;
            output::print_output(
                &format!("Planned scan of {target} every {interval} minutes"),
                global.quiet,
            );
            Ok(())
        }

        ScanCommand::List => {
            ctx.board.refresh().await?;
            let data: Vec<PlannedScan> = ctx.board.scheduled().iter().cloned().collect();
            let out = output::render_list(
                &global.output,
                &data,
                |p| ScheduleRow::from(p),
                |p| p.target.clone(),
            );
            output::print_output(&out, global.quiet);
            if ctx.board.due_count() > 0 {
                output::print_output(
                    &format!("{} schedule(s) due", ctx.board.due_count()),
                    global.quiet,
                );
            }
            Ok(())
        }

        ScanCommand::RunNow { target } => {
            let row = find_by_target(ctx, &target).await?;
            ctx.board.run_now(&row).await?;
            output::print_output(&format!("Ran scan of {target}"), global.quiet);
            Ok(())
        }

        ScanCommand::Pause { target } => {
            let row = find_by_target(ctx, &target).await?;
            ctx.board.stop(&row).await?;
            output::print_output(&format!("Paused schedule for {target}"), global.quiet);
            Ok(())
        }

        ScanCommand::Delete { interval } => {
            ctx.board.refresh().await?;
            let row = ctx
                .board
                .scheduled()
                .iter()
                .find(|p| p.interval == interval)
                .cloned()
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "planned scan".into(),
                    identifier: interval.to_string(),
                    list_command: "scan list".into(),
                })?;
            ctx.board.delete(&row).await?;
            output::print_output(
                &format!("Deleted schedule for {} ({interval} min)", row.target),
                global.quiet,
            );
            Ok(())
        }
    }
}

async fn find_by_target(ctx: &Context, target: &str) -> Result<PlannedScan, CliError> {
    ctx.board.refresh().await?;
    ctx.board
        .scheduled()
        .iter()
        .find(|p| p.target == target)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "planned scan".into(),
            identifier: target.into(),
            list_command: "scan list".into(),
        })
}
