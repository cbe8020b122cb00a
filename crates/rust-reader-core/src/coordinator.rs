//! Worker thread that owns the session and the drawing surface.
//!
//! The UI talks to the coordinator only through [`Message`]s and hears back
//! through [`ReaderEvent`]s and the frames its surface emits. Messages are
//! handled one at a time, in arrival order, each to completion.
//!
//! Document fetches run on their own short-lived threads and post their
//! result back into the same inbox, tagged with the generation of the `Init`
//! that started them. A result from an older generation is discarded.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{Receiver, Sender};
use rust_reader_config::{FontConfig, FontUpdate, ReaderColors, ReaderConfig};

use crate::render::render_status;
use crate::scrollbar::PointerInput;
use crate::search::MatchMode;
use crate::session::{Layout, Session, Viewport};
use crate::source::{load_text, TextSource};
use crate::surface::Surface;

/// Capacity of the coordinator inbox.
pub const INBOX_CAPACITY: usize = 256;

/// Starts a session on a new surface.
pub struct InitRequest {
    pub source_url: String,
    pub surface: Box<dyn Surface>,
    pub viewport: Viewport,
    pub font: FontConfig,
}

impl std::fmt::Debug for InitRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitRequest")
            .field("source_url", &self.source_url)
            .field("viewport", &self.viewport)
            .field("font", &self.font)
            .finish_non_exhaustive()
    }
}

/// Partial reconfiguration. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    pub font: FontUpdate,
    pub viewport: Option<Viewport>,
    pub colors: Option<ReaderColors>,
    pub match_mode: Option<MatchMode>,
}

/// Input to the coordinator.
#[derive(Debug)]
pub enum Message {
    Init(InitRequest),
    Update(UpdateRequest),
    /// Empty text clears the filter.
    Search { text: String },
    /// Positive values scroll further down.
    Scroll { delta: f32 },
    PointerDown(PointerInput),
    PointerUp(PointerInput),
    PointerMove(PointerInput),
    Dispose,
}

impl Message {
    fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "Init",
            Self::Update(_) => "Update",
            Self::Search { .. } => "Search",
            Self::Scroll { .. } => "Scroll",
            Self::PointerDown(_) => "PointerDown",
            Self::PointerUp(_) => "PointerUp",
            Self::PointerMove(_) => "PointerMove",
            Self::Dispose => "Dispose",
        }
    }

    /// Relative motion that a later message of the same kind supersedes.
    /// Everything else changes state the coordinator cannot recover on its own.
    pub fn is_droppable(&self) -> bool {
        matches!(self, Self::Scroll { .. } | Self::PointerMove(_))
    }
}

/// Notifications from the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderEvent {
    Loading {
        source: String,
    },
    Loaded {
        source: String,
        display_lines: usize,
        logical_lines: usize,
    },
    LoadFailed {
        source: String,
        error: String,
    },
    /// The line table was rebuilt after a font or width change.
    Rewrapped {
        display_lines: usize,
    },
    SearchUpdated {
        query: String,
        /// Direct matches, `None` when the filter was cleared.
        total: Option<usize>,
        /// Rows now displayed.
        shown: usize,
    },
    Disposed,
}

/// Settings that live for the coordinator's lifetime and seed every session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatorOptions {
    pub layout: Layout,
    pub colors: ReaderColors,
    pub match_mode: MatchMode,
}

impl CoordinatorOptions {
    pub fn from_config(config: &ReaderConfig, colors: ReaderColors) -> Self {
        Self {
            layout: Layout::from_config(config),
            colors,
            match_mode: MatchMode::from_regex_flag(config.search_regex),
        }
    }
}

enum Inbox {
    External(Message),
    Loaded {
        generation: u64,
        source: String,
        result: Result<String>,
    },
}

enum State {
    /// No surface yet.
    Idle,
    Loading { source: String },
    Failed { source: String, error: String },
    Ready(Session),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Failed { .. } => "failed",
            Self::Ready(_) => "ready",
        }
    }
}

/// The message loop. Create one with [`Coordinator::spawn`].
pub struct Coordinator {
    source: Arc<dyn TextSource>,
    options: CoordinatorOptions,
    events: Sender<ReaderEvent>,
    inbox_tx: Sender<Inbox>,
    surface: Option<Box<dyn Surface>>,
    viewport: Viewport,
    font: FontConfig,
    query: String,
    generation: u64,
    state: State,
}

impl Coordinator {
    /// Starts the coordinator thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(
        source: Arc<dyn TextSource>,
        options: CoordinatorOptions,
        events: Sender<ReaderEvent>,
    ) -> Result<CoordinatorHandle> {
        let (tx, rx) = crossbeam_channel::bounded(INBOX_CAPACITY);
        let coordinator = Self {
            source,
            options,
            events,
            inbox_tx: tx.clone(),
            surface: None,
            viewport: Viewport::default(),
            font: FontConfig::default(),
            query: String::new(),
            generation: 0,
            state: State::Idle,
        };
        let thread = std::thread::Builder::new()
            .name("reader-coordinator".to_string())
            .spawn(move || coordinator.run(rx))
            .context("failed to spawn coordinator thread")?;
        Ok(CoordinatorHandle {
            tx,
            thread: Some(thread),
        })
    }

    fn run(mut self, inbox: Receiver<Inbox>) {
        tracing::info!("Coordinator started");
        while let Ok(item) = inbox.recv() {
            let flow = match item {
                Inbox::External(message) => self.handle(message),
                Inbox::Loaded {
                    generation,
                    source,
                    result,
                } => {
                    self.on_loaded(generation, source, result);
                    ControlFlow::Continue(())
                }
            };
            if flow.is_break() {
                break;
            }
        }
        // Close the inbox before announcing shutdown so senders see it.
        drop(inbox);
        self.state = State::Idle;
        self.surface = None;
        self.emit(ReaderEvent::Disposed);
        tracing::info!("Coordinator stopped");
    }

    fn handle(&mut self, message: Message) -> ControlFlow<()> {
        match message {
            Message::Dispose => return ControlFlow::Break(()),
            Message::Init(request) => {
                self.init(request);
                return ControlFlow::Continue(());
            }
            _ if matches!(self.state, State::Idle) => {
                tracing::warn!("Ignoring {} before Init", message.name());
                return ControlFlow::Continue(());
            }
            _ => {}
        }

        match message {
            Message::Update(update) => self.update(update),
            Message::Search { text } => self.search(text),
            Message::Scroll { delta } => self.with_session(|s| s.scroll(delta)),
            Message::PointerDown(input) => self.with_session(|s| s.pointer_down(&input)),
            Message::PointerUp(input) => self.with_session(|s| s.pointer_up(&input)),
            Message::PointerMove(input) => self.with_session(|s| s.pointer_move(&input)),
            Message::Init(_) | Message::Dispose => {}
        }
        ControlFlow::Continue(())
    }

    fn init(&mut self, request: InitRequest) {
        self.generation += 1;
        let generation = self.generation;
        let InitRequest {
            source_url,
            mut surface,
            viewport,
            mut font,
        } = request;
        font.sanitize();

        surface.resize(viewport.width, viewport.height, viewport.pixel_ratio);
        self.surface = Some(surface);
        self.viewport = viewport;
        self.font = font;
        self.state = State::Loading {
            source: source_url.clone(),
        };
        tracing::info!("Loading {source_url} (generation {generation})");
        self.emit(ReaderEvent::Loading {
            source: source_url.clone(),
        });
        self.draw_status();

        let source = Arc::clone(&self.source);
        let tx = self.inbox_tx.clone();
        let location = source_url.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("reader-fetch-{generation}"))
            .spawn(move || {
                let result = load_text(source.as_ref(), &location);
                let loaded = Inbox::Loaded {
                    generation,
                    source: location,
                    result,
                };
                if tx.send(loaded).is_err() {
                    tracing::debug!("Fetch finished after coordinator shut down");
                }
            });
        if let Err(e) = spawned {
            self.fail(source_url, anyhow!(e).context("failed to spawn fetch thread"));
        }
    }

    fn on_loaded(&mut self, generation: u64, source: String, result: Result<String>) {
        if generation != self.generation {
            tracing::warn!(
                "Discarding stale fetch of {source} (generation {generation}, current {})",
                self.generation
            );
            return;
        }
        let text = match result {
            Ok(text) => text,
            Err(e) => return self.fail(source, e),
        };

        let mut session = Session::new(
            text,
            self.font.clone(),
            self.viewport,
            self.options.layout,
            self.options.colors.clone(),
            self.options.match_mode,
        );
        let status = session.status();
        self.emit(ReaderEvent::Loaded {
            source,
            display_lines: status.line_count,
            logical_lines: status.logical_lines,
        });
        if !self.query.is_empty() {
            let outcome = session.set_search_query(&self.query);
            let event = ReaderEvent::SearchUpdated {
                query: self.query.clone(),
                total: outcome.total(),
                shown: outcome.lines().len(),
            };
            self.emit(event);
        }
        self.state = State::Ready(session);
        self.render();
    }

    fn fail(&mut self, source: String, error: anyhow::Error) {
        tracing::error!("Failed to load {source}: {error:#}");
        let error = format!("{error:#}");
        self.emit(ReaderEvent::LoadFailed {
            source: source.clone(),
            error: error.clone(),
        });
        self.state = State::Failed { source, error };
        self.draw_status();
    }

    fn update(&mut self, update: UpdateRequest) {
        if let Some(colors) = &update.colors {
            self.options.colors = colors.clone();
        }
        if let Some(mode) = update.match_mode {
            self.options.match_mode = mode;
        }
        if let Some(viewport) = update.viewport {
            self.viewport = viewport;
            if let Some(surface) = self.surface.as_mut() {
                surface.resize(viewport.width, viewport.height, viewport.pixel_ratio);
            }
        }

        match &mut self.state {
            State::Ready(session) => {
                if let Some(colors) = update.colors {
                    session.set_colors(colors);
                }
                if let Some(mode) = update.match_mode {
                    session.set_match_mode(mode);
                }
                let rewrapped = session.configure(&update.font, update.viewport);
                self.font = session.font().clone();
                let display_lines = session.lines().len();
                if rewrapped {
                    self.emit(ReaderEvent::Rewrapped { display_lines });
                }
                self.render();
            }
            _ => {
                self.font = update.font.apply(&self.font);
                self.draw_status();
            }
        }
    }

    fn search(&mut self, text: String) {
        self.query = text;
        let State::Ready(session) = &mut self.state else {
            tracing::debug!(
                "Search {:?} deferred while {}",
                self.query,
                self.state.name()
            );
            return;
        };
        let outcome = session.set_search_query(&self.query);
        let event = ReaderEvent::SearchUpdated {
            query: self.query.clone(),
            total: outcome.total(),
            shown: outcome.lines().len(),
        };
        self.emit(event);
        self.render();
    }

    /// Runs an input handler against the ready session and re-renders when it
    /// reports a change.
    fn with_session(&mut self, f: impl FnOnce(&mut Session) -> bool) {
        match &mut self.state {
            State::Ready(session) => {
                if f(session) {
                    self.render();
                }
            }
            other => tracing::trace!("Input ignored while {}", other.name()),
        }
    }

    fn render(&mut self) {
        if let (State::Ready(session), Some(surface)) = (&self.state, self.surface.as_mut()) {
            session.render(surface.as_mut());
        }
    }

    fn draw_status(&mut self) {
        let message = match &self.state {
            State::Loading { source } => format!("Loading {source}…"),
            State::Failed { source, error } => format!("Could not load {source}: {error}"),
            State::Idle | State::Ready(_) => return,
        };
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.clear(self.options.colors.background);
        render_status(
            surface.as_mut(),
            &message,
            &self.font,
            &self.options.colors,
            &self.viewport,
        );
        surface.present();
    }

    fn emit(&self, event: ReaderEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Event receiver closed");
        }
    }
}

/// Owning handle to a running coordinator. Dropping it disposes the coordinator.
pub struct CoordinatorHandle {
    tx: Sender<Inbox>,
    thread: Option<JoinHandle<()>>,
}

impl CoordinatorHandle {
    /// Queues `message`, blocking while the inbox is full.
    ///
    /// # Errors
    ///
    /// Returns an error once the coordinator has shut down.
    pub fn send(&self, message: Message) -> Result<()> {
        self.tx
            .send(Inbox::External(message))
            .map_err(|_| anyhow!("coordinator has shut down"))
    }

    /// Queues `message` unless the inbox is full. Returns false if it was dropped.
    ///
    /// # Errors
    ///
    /// Returns an error once the coordinator has shut down.
    pub fn try_send(&self, message: Message) -> Result<bool> {
        match self.tx.try_send(Inbox::External(message)) {
            Ok(()) => Ok(true),
            Err(crossbeam_channel::TrySendError::Full(_)) => Ok(false),
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                Err(anyhow!("coordinator has shut down"))
            }
        }
    }

    /// Delivers input: droppable messages go through [`try_send`](Self::try_send),
    /// the rest wait for room in the inbox. Returns false if the message was dropped.
    ///
    /// # Errors
    ///
    /// Returns an error once the coordinator has shut down.
    pub fn forward(&self, message: Message) -> Result<bool> {
        if message.is_droppable() {
            self.try_send(message)
        } else {
            self.send(message).map(|()| true)
        }
    }

    /// Sends `Dispose` and waits for the thread to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinator thread panicked.
    pub fn dispose(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // Already gone if the send fails; join regardless.
        let _ = self.tx.send(Inbox::External(Message::Dispose));
        thread
            .join()
            .map_err(|_| anyhow!("coordinator thread panicked"))
    }
}

impl Drop for CoordinatorHandle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!("{e:#}");
        }
    }
}
