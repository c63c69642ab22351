//! Realtime board events over a WebSocket.
//!
//! The server pushes `{"event": "board:update", "data": {...}}` frames to
//! every client that joined the board's room. `data` is one loosely shaped
//! object whose `type` field decides which other fields are present; it is
//! decoded once here into [`BoardEvent`] so handlers match exhaustively.
//!
//! A [`RealtimeChannel`] owns one connection. Consumers register interest
//! with [`RealtimeChannel::watch`] / [`RealtimeChannel::unwatch`]; interest
//! is reference counted, so a board leaves the room only when its last
//! watcher goes away. Every (re)connect joins all watched boards again.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::api::BoardApi;
use super::store::{self, SharedStore};
use crate::config::{MAX_PING_INTERVAL_SECS, RealtimeConfig};
use crate::errors::{BoardError, BoardResult};

pub const EVENT_BOARD_UPDATE: &str = "board:update";
pub const EVENT_JOIN: &str = "join";
pub const EVENT_LEAVE: &str = "leave";

const EVENT_CAPACITY: usize = 256;
const MIN_RETRY: Duration = Duration::from_millis(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Called once for every `board:update` frame, before subscribers see it.
pub type RefreshCallback = Arc<dyn Fn(&BoardEvent) + Send + Sync>;

// ── Wire format ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn join(board_id: &str) -> Self {
        Self::room(EVENT_JOIN, board_id)
    }

    pub fn leave(board_id: &str) -> Self {
        Self::room(EVENT_LEAVE, board_id)
    }

    fn room(event: &str, board_id: &str) -> Self {
        Self {
            event: event.to_string(),
            data: serde_json::json!({ "boardId": board_id }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBoardUpdate {
    #[serde(rename = "type")]
    kind: Option<String>,
    task_id: Option<String>,
    board_id: Option<String>,
    progress: Option<Value>,
    processing_time_ms: Option<u64>,
    successful_agents: Option<u32>,
    errors: Vec<Value>,
}

// ── Decoded events ───────────────────────────────────────────────────

/// Non-agent update types. Anything unrecognised is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskDeleted,
    ColumnCreated,
    ColumnUpdated,
    ColumnDeleted,
    BoardUpdated,
    Other(String),
}

impl MutationKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "task.created" => MutationKind::TaskCreated,
            "task.updated" => MutationKind::TaskUpdated,
            "task.moved" => MutationKind::TaskMoved,
            "task.deleted" => MutationKind::TaskDeleted,
            "column.created" => MutationKind::ColumnCreated,
            "column.updated" => MutationKind::ColumnUpdated,
            "column.deleted" => MutationKind::ColumnDeleted,
            "board.updated" => MutationKind::BoardUpdated,
            other => MutationKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MutationKind::TaskCreated => "task.created",
            MutationKind::TaskUpdated => "task.updated",
            MutationKind::TaskMoved => "task.moved",
            MutationKind::TaskDeleted => "task.deleted",
            MutationKind::ColumnCreated => "column.created",
            MutationKind::ColumnUpdated => "column.updated",
            MutationKind::ColumnDeleted => "column.deleted",
            MutationKind::BoardUpdated => "board.updated",
            MutationKind::Other(kind) => kind,
        }
    }

    /// Column or board changes; the board itself must be reloaded.
    pub fn affects_board_layout(&self) -> bool {
        matches!(
            self,
            MutationKind::ColumnCreated
                | MutationKind::ColumnUpdated
                | MutationKind::ColumnDeleted
                | MutationKind::BoardUpdated
        )
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProgress {
    pub stage: String,
    pub percent: Option<f64>,
    pub message: Option<String>,
}

impl AgentProgress {
    /// Objects decode field by field; a bare string is taken as the stage.
    fn from_value(value: Option<Value>) -> Self {
        match value {
            Some(Value::String(stage)) => AgentProgress {
                stage,
                ..Default::default()
            },
            Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            _ => AgentProgress::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionSummary {
    pub processing_time_ms: Option<u64>,
    pub successful_agents: Option<u32>,
    pub errors: Vec<String>,
}

impl CompletionSummary {
    pub fn elapsed(&self) -> Option<Duration> {
        self.processing_time_ms.map(Duration::from_millis)
    }
}

impl std::fmt::Display for CompletionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.elapsed() {
            Some(elapsed) => write!(f, "finished in {:.1}s", elapsed.as_secs_f64())?,
            None => write!(f, "finished")?,
        }
        if let Some(count) = self.successful_agents {
            write!(f, ", {} agent(s) succeeded", count)?;
        }
        if !self.errors.is_empty() {
            write!(f, ", {} error(s): {}", self.errors.len(), self.errors.join("; "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    Mutation {
        kind: MutationKind,
        board_id: Option<String>,
        task_id: Option<String>,
    },
    AgentProgress {
        board_id: Option<String>,
        task_id: String,
        progress: AgentProgress,
    },
    AgentCompleted {
        board_id: Option<String>,
        task_id: String,
        summary: CompletionSummary,
    },
}

impl BoardEvent {
    /// Decode a `board:update` payload. Never fails: agent events without a
    /// task id and payloads of unexpected shape become generic mutations.
    pub fn from_payload(data: &Value) -> Self {
        let raw: RawBoardUpdate = serde_json::from_value(data.clone()).unwrap_or_default();
        let kind = raw.kind.unwrap_or_else(|| "unknown".to_string());
        match (kind.as_str(), raw.task_id) {
            ("agent.progress", Some(task_id)) => BoardEvent::AgentProgress {
                board_id: raw.board_id,
                task_id,
                progress: AgentProgress::from_value(raw.progress),
            },
            ("agent.completed", Some(task_id)) => BoardEvent::AgentCompleted {
                board_id: raw.board_id,
                task_id,
                summary: CompletionSummary {
                    processing_time_ms: raw.processing_time_ms,
                    successful_agents: raw.successful_agents,
                    errors: raw.errors.iter().map(error_text).collect(),
                },
            },
            (_, task_id) => BoardEvent::Mutation {
                kind: MutationKind::parse(&kind),
                board_id: raw.board_id,
                task_id,
            },
        }
    }

    pub fn board_id(&self) -> Option<&str> {
        match self {
            BoardEvent::Mutation { board_id, .. }
            | BoardEvent::AgentProgress { board_id, .. }
            | BoardEvent::AgentCompleted { board_id, .. } => board_id.as_deref(),
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            BoardEvent::Mutation { task_id, .. } => task_id.as_deref(),
            BoardEvent::AgentProgress { task_id, .. } | BoardEvent::AgentCompleted { task_id, .. } => {
                Some(task_id)
            }
        }
    }
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

// ── Watch set ────────────────────────────────────────────────────────

/// Board ids with the number of consumers watching each.
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    counts: BTreeMap<String, usize>,
}

/// Rooms to join and leave after a change to the watch set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchDiff {
    pub joined: Vec<String>,
    pub left: Vec<String>,
}

impl WatchSet {
    /// Add one watcher per id. Returns the ids that were not watched before.
    pub fn watch<I, S>(&mut self, board_ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut joined = Vec::new();
        for id in board_ids {
            let id = id.into();
            let count = self.counts.entry(id.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                joined.push(id);
            }
        }
        joined
    }

    /// Remove one watcher per id. Returns the ids nobody watches any more.
    /// Ids that were never watched are ignored.
    pub fn unwatch<I, S>(&mut self, board_ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut left = Vec::new();
        for id in board_ids {
            let id = id.into();
            let Some(count) = self.counts.get_mut(&id) else {
                continue;
            };
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&id);
                left.push(id);
            }
        }
        left
    }

    /// Move one consumer from `previous` to `next`. Boards present in both
    /// keep their room membership throughout.
    pub fn retarget(&mut self, previous: &[String], next: &[String]) -> WatchDiff {
        let joined = self.watch(next.iter().cloned());
        let left = self.unwatch(previous.iter().cloned());
        WatchDiff { joined, left }
    }

    pub fn boards(&self) -> Vec<String> {
        self.counts.keys().cloned().collect()
    }

    pub fn is_watching(&self, board_id: &str) -> bool {
        self.counts.contains_key(board_id)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

// ── Progress map ─────────────────────────────────────────────────────

/// Latest agent progress per task, for display.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<Mutex<HashMap<String, AgentProgress>>>,
}

impl ProgressTracker {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, AgentProgress>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, task_id: &str) -> Option<AgentProgress> {
        self.entries().get(task_id).cloned()
    }

    pub fn snapshot(&self) -> HashMap<String, AgentProgress> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn set(&self, task_id: &str, progress: AgentProgress) {
        self.entries().insert(task_id.to_string(), progress);
    }

    fn clear(&self, task_id: &str) {
        self.entries().remove(task_id);
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────

/// Routes decoded events to the refresh callback, the progress map and
/// broadcast subscribers.
#[derive(Clone)]
pub struct Dispatcher {
    refresh: RefreshCallback,
    progress: ProgressTracker,
    events: broadcast::Sender<BoardEvent>,
}

impl Dispatcher {
    pub fn new(refresh: RefreshCallback) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            refresh,
            progress: ProgressTracker::default(),
            events,
        }
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Handle one text frame. Returns whether it carried a board update.
    pub fn handle_text(&self, text: &str) -> bool {
        let envelope: Envelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, "ignoring malformed realtime frame");
                return false;
            }
        };
        if envelope.event != EVENT_BOARD_UPDATE {
            debug!(event = %envelope.event, "ignoring realtime event");
            return false;
        }
        self.dispatch(BoardEvent::from_payload(&envelope.data));
        true
    }

    pub fn dispatch(&self, event: BoardEvent) {
        match &event {
            BoardEvent::Mutation { kind, board_id, .. } => {
                debug!(kind = %kind, board_id = ?board_id, "board mutation");
            }
            BoardEvent::AgentProgress {
                task_id, progress, ..
            } => {
                self.progress.set(task_id, progress.clone());
            }
            BoardEvent::AgentCompleted {
                task_id, summary, ..
            } => {
                self.progress.clear(task_id);
                info!(task_id = %task_id, summary = %summary, "agent run completed");
            }
        }
        (self.refresh)(&event);
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

// ── Connection ───────────────────────────────────────────────────────

enum Command {
    Join(Vec<String>),
    Leave(Vec<String>),
    Shutdown,
}

enum SessionEnd {
    Disconnected,
    Shutdown,
}

fn lock_watches(watches: &Mutex<WatchSet>) -> MutexGuard<'_, WatchSet> {
    watches.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Doubles the delay up to `max`.
pub fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

/// How long a ping may go unanswered before the connection counts as dead.
fn pong_timeout(ping_interval: Duration) -> Duration {
    ping_interval.saturating_mul(2)
}

/// Rooms joined on the current socket. Join and leave commands are reduced
/// to the rooms whose membership actually changes.
#[derive(Debug, Default)]
struct SessionRooms {
    joined: BTreeSet<String>,
}

impl SessionRooms {
    fn join(&mut self, board_ids: &[String]) -> Vec<String> {
        board_ids
            .iter()
            .filter(|id| self.joined.insert((*id).clone()))
            .cloned()
            .collect()
    }

    fn leave(&mut self, board_ids: &[String]) -> Vec<String> {
        board_ids
            .iter()
            .filter(|id| self.joined.remove(id.as_str()))
            .cloned()
            .collect()
    }
}

struct ConnectionContext {
    url: String,
    token: Option<String>,
    reconnect_initial: Duration,
    reconnect_max: Duration,
    ping_interval: Duration,
    watches: Arc<Mutex<WatchSet>>,
    dispatcher: Dispatcher,
}

/// One owned realtime connection. Dropping it aborts the connection task;
/// [`RealtimeChannel::shutdown`] closes it gracefully.
pub struct RealtimeChannel {
    commands: mpsc::UnboundedSender<Command>,
    watches: Arc<Mutex<WatchSet>>,
    dispatcher: Dispatcher,
    task: Option<JoinHandle<()>>,
}

impl RealtimeChannel {
    /// Start connecting in the background. Connection failures are retried
    /// with capped exponential backoff and never surface to the caller.
    pub fn connect(
        url: impl Into<String>,
        token: Option<String>,
        config: &RealtimeConfig,
        refresh: RefreshCallback,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let watches = Arc::new(Mutex::new(WatchSet::default()));
        let dispatcher = Dispatcher::new(refresh);
        let ctx = ConnectionContext {
            url: url.into(),
            token,
            reconnect_initial: config.reconnect_initial().max(MIN_RETRY),
            reconnect_max: config.reconnect_max().max(MIN_RETRY),
            ping_interval: config
                .ping_interval()
                .clamp(Duration::from_secs(1), Duration::from_secs(MAX_PING_INTERVAL_SECS)),
            watches: watches.clone(),
            dispatcher: dispatcher.clone(),
        };
        let task = tokio::spawn(run_connection(ctx, command_rx));
        Self {
            commands,
            watches,
            dispatcher,
            task: Some(task),
        }
    }

    pub fn watch<I, S>(&self, board_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined = lock_watches(&self.watches).watch(board_ids);
        if !joined.is_empty() {
            let _ = self.commands.send(Command::Join(joined));
        }
    }

    pub fn unwatch<I, S>(&self, board_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let left = lock_watches(&self.watches).unwatch(board_ids);
        if !left.is_empty() {
            let _ = self.commands.send(Command::Leave(left));
        }
    }

    /// Swap one consumer's board set without dropping shared rooms.
    pub fn retarget(&self, previous: &[String], next: &[String]) -> WatchDiff {
        let diff = lock_watches(&self.watches).retarget(previous, next);
        if !diff.joined.is_empty() {
            let _ = self.commands.send(Command::Join(diff.joined.clone()));
        }
        if !diff.left.is_empty() {
            let _ = self.commands.send(Command::Leave(diff.left.clone()));
        }
        diff
    }

    pub fn watched_boards(&self) -> Vec<String> {
        lock_watches(&self.watches).boards()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.dispatcher.subscribe()
    }

    pub fn progress(&self) -> &ProgressTracker {
        self.dispatcher.progress()
    }

    /// Close the socket and wait for the connection task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn open_socket(url: &str, token: Option<&str>) -> BoardResult<WsStream> {
    let mut request = url
        .into_client_request()
        .map_err(|e| BoardError::Realtime(format!("invalid realtime url {}: {}", url, e)))?;
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| BoardError::Realtime(format!("invalid token: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }
    let (socket, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| BoardError::Realtime(format!("connect to {} failed: {}", url, e)))?;
    Ok(socket)
}

async fn run_connection(ctx: ConnectionContext, mut commands: mpsc::UnboundedReceiver<Command>) {
    let mut backoff = ctx.reconnect_initial;
    loop {
        match open_socket(&ctx.url, ctx.token.as_deref()).await {
            Ok(socket) => {
                info!(url = %ctx.url, "realtime connected");
                backoff = ctx.reconnect_initial;
                match run_session(socket, &ctx, &mut commands).await {
                    SessionEnd::Shutdown => return,
                    SessionEnd::Disconnected => warn!(url = %ctx.url, "realtime connection lost"),
                }
            }
            Err(err) => {
                warn!(error = %err, retry_in_ms = backoff.as_millis() as u64, "realtime connect failed");
            }
        }

        // Room changes made while offline live in the watch set and are
        // replayed on the next connect.
        let wait = tokio::time::sleep(backoff);
        tokio::pin!(wait);
        loop {
            tokio::select! {
                _ = &mut wait => break,
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => return,
                    Some(_) => continue,
                },
            }
        }
        backoff = next_backoff(backoff, ctx.reconnect_max);
    }
}

async fn send_envelope<S>(sender: &mut S, envelope: &Envelope) -> bool
where
    S: Sink<Message> + Unpin,
{
    match serde_json::to_string(envelope) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(err) => {
            warn!(error = %err, "failed to encode realtime frame");
            true
        }
    }
}

async fn send_rooms<S>(sender: &mut S, board_ids: &[String], join: bool) -> bool
where
    S: Sink<Message> + Unpin,
{
    for board_id in board_ids {
        let envelope = if join {
            Envelope::join(board_id)
        } else {
            Envelope::leave(board_id)
        };
        if !send_envelope(sender, &envelope).await {
            return false;
        }
        debug!(board_id = %board_id, event = %envelope.event, "realtime room change");
    }
    true
}

async fn run_session(
    socket: WsStream,
    ctx: &ConnectionContext,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> SessionEnd {
    let (mut sender, mut receiver) = socket.split();

    // Room changes queued while offline are covered by the full rejoin.
    while let Ok(command) = commands.try_recv() {
        if matches!(command, Command::Shutdown) {
            return SessionEnd::Shutdown;
        }
    }
    // A watch() racing this read shows up both here and as a queued Join;
    // `rooms` drops the repeat.
    let mut rooms = SessionRooms::default();
    let boards = rooms.join(&lock_watches(&ctx.watches).boards());
    if !send_rooms(&mut sender, &boards, true).await {
        return SessionEnd::Disconnected;
    }

    let mut ping_interval = tokio::time::interval(ctx.ping_interval);
    ping_interval.tick().await;
    let pong_deadline = pong_timeout(ctx.ping_interval);
    let mut last_pong = Instant::now();
    let mut awaiting_pong = false;

    let end = loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if awaiting_pong && last_pong.elapsed() > pong_deadline {
                    break SessionEnd::Disconnected;
                }
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break SessionEnd::Disconnected;
                }
                awaiting_pong = true;
            }

            command = commands.recv() => {
                let sent = match command {
                    Some(Command::Join(ids)) => send_rooms(&mut sender, &rooms.join(&ids), true).await,
                    Some(Command::Leave(ids)) => send_rooms(&mut sender, &rooms.leave(&ids), false).await,
                    Some(Command::Shutdown) | None => break SessionEnd::Shutdown,
                };
                if !sent {
                    break SessionEnd::Disconnected;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        ctx.dispatcher.handle_text(&text);
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break SessionEnd::Disconnected,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "realtime read failed");
                        break SessionEnd::Disconnected;
                    }
                }
            }
        }
    };

    let _ = sender.send(Message::Close(None)).await;
    end
}

// ── Store wiring ─────────────────────────────────────────────────────

/// A refresh callback that reloads `store` from `api` on a background task.
/// Bursts of events arriving during a reload collapse into one more reload.
/// The task ends once the callback is dropped.
pub fn store_refresher(api: Arc<dyn BoardApi>, store: SharedStore) -> RefreshCallback {
    let (tx, mut rx) = mpsc::unbounded_channel::<()>();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            while rx.try_recv().is_ok() {}
            if let Err(err) = store::refresh(api.as_ref(), &store).await {
                warn!(error = %err, "realtime refresh failed");
            }
        }
    });
    Arc::new(move |_event: &BoardEvent| {
        let _ = tx.send(());
    })
}
