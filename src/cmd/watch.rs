//! Live event stream: `flowboard watch`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use flowboard::board::BoardSession;
use flowboard::board::realtime::{BoardEvent, RealtimeChannel, RefreshCallback, store_refresher};
use flowboard::config::FlowboardConfig;

use super::{api, open_session};

pub async fn cmd_watch(config: &FlowboardConfig, board_ids: &[String]) -> Result<()> {
    let api = api(config);
    let mut sessions: HashMap<String, BoardSession> = HashMap::new();
    for board_id in board_ids {
        let session = open_session(config, board_id).await?;
        println!(
            "{} {} ({} tasks)",
            style("Watching").cyan().bold(),
            session.board().name,
            session.tasks().len()
        );
        sessions.insert(board_id.clone(), session);
    }

    let refreshers: HashMap<String, RefreshCallback> = sessions
        .iter()
        .map(|(id, session)| (id.clone(), store_refresher(api.clone(), session.store().clone())))
        .collect();
    let route: RefreshCallback = Arc::new(move |event: &BoardEvent| {
        match event.board_id().and_then(|id| refreshers.get(id)) {
            Some(refresh) => refresh(event),
            None => refreshers.values().for_each(|refresh| refresh(event)),
        }
    });

    let channel = RealtimeChannel::connect(
        config.server.ws_url.clone(),
        config.server.token.clone(),
        &config.realtime,
        route,
    );
    channel.watch(board_ids.iter().cloned());
    let mut events = channel.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = events.recv() => match received {
                Ok(event) => {
                    print_event(&event);
                    if let BoardEvent::Mutation { kind, board_id: Some(board_id), .. } = &event {
                        if kind.affects_board_layout() {
                            if let Some(session) = sessions.get_mut(board_id) {
                                if let Err(err) = session.reload_board().await {
                                    warn!(board_id = %board_id, error = %err, "board reload failed");
                                }
                            }
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    channel.shutdown().await;
    println!("{}", style("Stopped.").dim());
    Ok(())
}

fn print_event(event: &BoardEvent) {
    let board = event.board_id().unwrap_or("-");
    match event {
        BoardEvent::Mutation { kind, task_id, .. } => {
            println!(
                "[{}] {} {}",
                style(board).dim(),
                style(kind).bold(),
                task_id.as_deref().unwrap_or("")
            );
        }
        BoardEvent::AgentProgress {
            task_id, progress, ..
        } => {
            let percent = progress
                .percent
                .map(|p| format!(" {:.0}%", p))
                .unwrap_or_default();
            let message = progress
                .message
                .as_deref()
                .map(|m| format!(" {}", m))
                .unwrap_or_default();
            println!(
                "[{}] {} {} {}{}{}",
                style(board).dim(),
                style("agent").magenta(),
                task_id,
                progress.stage,
                percent,
                message
            );
        }
        BoardEvent::AgentCompleted {
            task_id, summary, ..
        } => {
            let label = if summary.errors.is_empty() {
                style("agent done").green()
            } else {
                style("agent done").yellow()
            };
            println!("[{}] {} {} {}", style(board).dim(), label, task_id, summary);
        }
    }
}
