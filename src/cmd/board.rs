//! Read-only board commands: `flowboard show` and `flowboard wip`.

use anyhow::Result;
use chrono::Utc;
use console::style;

use flowboard::board::view::{self, ColumnGroup, ViewClock};
use flowboard::board::TaskFilter;
use flowboard::config::FlowboardConfig;
use flowboard_common::{Task, WipStatus};

use super::open_session;

pub async fn cmd_show(
    config: &FlowboardConfig,
    board_id: &str,
    filter: &TaskFilter,
    swimlanes: bool,
) -> Result<()> {
    let session = open_session(config, board_id).await?;
    let clock = session.clock(Utc::now());

    session.with_tasks(|board, tasks| {
        println!("{} {}", style(&board.name).bold().cyan(), style(format!("({})", board.id)).dim());
        if !filter.is_empty() {
            let shown = view::filter_tasks(tasks, board, filter, &clock).len();
            println!("{}", style(format!("{} of {} tasks match", shown, tasks.len())).dim());
        }
        println!();

        if swimlanes {
            for lane in view::group_by_swimlane(tasks, board, filter, &clock) {
                println!(
                    "{} {}",
                    style(&lane.project.name).bold().underlined(),
                    style(lane.task_count()).dim()
                );
                for group in &lane.columns {
                    print_group(group, &clock, "  ");
                }
                println!();
            }
        } else {
            for group in view::group_by_column(tasks, board, filter, &clock) {
                print_group(&group, &clock, "");
            }
        }
    });
    Ok(())
}

fn print_group(group: &ColumnGroup<'_>, clock: &ViewClock, indent: &str) {
    let count = match group.column.wip_limit {
        Some(limit) => format!("{}/{}", group.tasks.len(), limit),
        None => group.tasks.len().to_string(),
    };
    let count = if group.over_limit() {
        style(count).red().bold()
    } else {
        style(count).dim()
    };
    println!(
        "{}{} [{}] {}",
        indent,
        style(&group.column.name).bold(),
        group.column.column_type,
        count
    );
    for task in &group.tasks {
        println!("{}  {}", indent, task_line(task, clock));
    }
}

fn task_line(task: &Task, clock: &ViewClock) -> String {
    let mut line = format!("{} {}", style(&task.id).dim(), task.title);
    if let Some(context) = task.context {
        line.push_str(&format!(" {}", style(format!("@{}", context)).cyan()));
    }
    if let Some(waiting) = &task.waiting_for {
        line.push_str(&format!(" {}", style(format!("(waiting for {})", waiting)).dim()));
    }
    if task.is_done {
        line.push_str(&format!(" {}", style("done").green()));
    } else if view::is_stale(task, clock) {
        line.push_str(&format!(" {}", style("stale").yellow()));
    }
    if task.has_hints() {
        line.push_str(&format!(" {}", style("hint").magenta()));
    }
    line
}

pub async fn cmd_wip(config: &FlowboardConfig, board_id: &str) -> Result<()> {
    let session = open_session(config, board_id).await?;
    let statuses = session.wip_status().await?;
    println!("{}", style(format!("WIP limits for {}", session.board().name)).bold().cyan());
    for status in &statuses {
        println!("  {}", wip_line(status));
    }
    Ok(())
}

fn wip_line(status: &WipStatus) -> String {
    let limit = status
        .wip_limit
        .map(|l| l.to_string())
        .unwrap_or_else(|| "∞".to_string());
    let numbers = format!("{}/{}", status.current_count, limit);
    let numbers = if status.at_limit {
        style(numbers).red().bold().to_string()
    } else {
        numbers
    };
    format!("{:<20} {}", status.column_name, numbers)
}
