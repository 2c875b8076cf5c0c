//! The aggregation engine actor.
//!
//! [`Engine`] owns one [`AggregateState`] and is the only code that mutates it.
//! It runs as a single tokio task and multiplexes three inputs:
//!
//! - presenter commands arriving through an [`EngineHandle`]
//! - [`Completion`]s posted by the [`ActionExecutor`]
//! - change notifications of the shared [`FavoritesStore`]
//!
//! Because all three are drained by one `select!` loop, transitions are
//! serialized without any lock on the aggregate. Every committed transition
//! publishes exactly one [`MovieListView`] to each live subscriber, and every
//! view reads the favorite ids from the store at the moment it is built.
//!
//! That read happens on the engine task. It takes the store's snapshot lock,
//! which a favorites write only holds for the swap after the backend write, so
//! a slow disk never stalls the engine. The first read of a fresh store is the
//! exception: it loads the backend synchronously.

use crate::app::handler::{handle_event, Event};
use crate::app::projection::MovieListView;
use crate::app::state::AggregateState;
use crate::catalog::{CatalogClient, ImageResource};
use crate::domain::error::{ReelError, Result};
use crate::storage::{FavoritesChange, FavoritesStore};
use crate::worker::{ActionExecutor, Completion};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Default minimum interval between two next-page dispatches.
pub const DEFAULT_NEXT_PAGE_COOLDOWN: Duration = Duration::from_secs(3);

/// Tunables of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum interval between two accepted `load_next_page` calls.
    pub next_page_cooldown: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            next_page_cooldown: DEFAULT_NEXT_PAGE_COOLDOWN,
        }
    }
}

enum Command {
    Event(Event),
    View(oneshot::Sender<MovieListView>),
    Subscribe(oneshot::Sender<ViewSubscription>),
}

/// Actor owning the aggregate.
pub struct Engine {
    state: AggregateState,
    favorites: Arc<FavoritesStore>,
    executor: ActionExecutor,
    commands: mpsc::UnboundedReceiver<Command>,
    completions: mpsc::UnboundedReceiver<Completion>,
    favorite_changes: broadcast::Receiver<FavoritesChange>,
    subscribers: Vec<mpsc::UnboundedSender<MovieListView>>,
}

impl Engine {
    /// Starts an engine task and returns its handle.
    ///
    /// The task runs until every [`EngineHandle`] clone is dropped. Must be
    /// called from within a tokio runtime.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use reelsync::app::{Engine, EngineConfig};
    /// use reelsync::catalog::{TmdbCatalog, TmdbSettings};
    /// use reelsync::storage::{FavoritesStore, MemoryStore};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// # async fn run() -> reelsync::Result<()> {
    /// let catalog = TmdbCatalog::new(TmdbSettings {
    ///     api_base_url: "https://api.themoviedb.org".into(),
    ///     image_base_url: "https://image.tmdb.org/t/p/original".into(),
    ///     api_token: None,
    ///     language: "en-US".into(),
    ///     request_timeout: Duration::from_secs(10),
    /// })?;
    /// let favorites = Arc::new(FavoritesStore::new(MemoryStore::new()));
    ///
    /// let engine = Engine::spawn(Arc::new(catalog), favorites, EngineConfig::default());
    /// let mut views = engine.subscribe().await?;
    /// engine.load()?;
    /// while let Some(view) = views.next().await {
    ///     println!("{} movies", view.items.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(
        catalog: Arc<dyn CatalogClient>,
        favorites: Arc<FavoritesStore>,
        config: EngineConfig,
    ) -> EngineHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let engine = Self {
            state: AggregateState::new(config.next_page_cooldown),
            favorite_changes: favorites.subscribe(),
            executor: ActionExecutor::new(
                Arc::clone(&catalog),
                Arc::clone(&favorites),
                completion_tx,
            ),
            favorites,
            commands: command_rx,
            completions: completion_rx,
            subscribers: Vec::new(),
        };

        tracing::debug!(
            next_page_cooldown_ms =
                u64::try_from(config.next_page_cooldown.as_millis()).unwrap_or(u64::MAX),
            "spawning engine"
        );
        tokio::spawn(engine.run());

        EngineHandle {
            commands: command_tx,
            catalog,
        }
    }

    async fn run(mut self) {
        let mut favorites_open = true;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = self.completions.recv() => {
                    self.dispatch(Event::Completion(completion));
                }
                change = self.favorite_changes.recv(), if favorites_open => match change {
                    Ok(change) => {
                        tracing::debug!(
                            movie_id = change.id,
                            is_favorite = change.is_favorite,
                            "favorites changed"
                        );
                        self.dispatch(Event::FavoritesChanged);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "favorites notifications lagged");
                        self.dispatch(Event::FavoritesChanged);
                    }
                    Err(RecvError::Closed) => favorites_open = false,
                },
            }
        }

        tracing::debug!(epoch = self.state.epoch, "engine stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Event(event) => self.dispatch(event),
            Command::View(reply) => {
                // The caller may have given up waiting.
                let _ = reply.send(self.current_view());
            }
            Command::Subscribe(reply) => {
                let (tx, rx) = mpsc::unbounded_channel();
                if tx.send(self.current_view()).is_ok()
                    && reply.send(ViewSubscription { views: rx }).is_ok()
                {
                    self.subscribers.push(tx);
                    tracing::debug!(subscribers = self.subscribers.len(), "subscriber added");
                }
            }
        }
    }

    fn dispatch(&mut self, event: Event) {
        let (changed, actions) = handle_event(&mut self.state, event);

        if changed {
            self.publish();
        }

        for action in actions {
            self.executor.execute(action);
        }
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }

        let view = self.current_view();
        self.subscribers.retain(|subscriber| subscriber.send(view.clone()).is_ok());
    }

    fn current_view(&self) -> MovieListView {
        self.state.view(&self.favorites.list_ids())
    }
}

/// Cloneable command interface of a running [`Engine`].
///
/// Commands are fire-and-forget: they return as soon as the engine accepted
/// them. Outcomes are observed through [`EngineHandle::view`] or a
/// [`ViewSubscription`].
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    catalog: Arc<dyn CatalogClient>,
}

impl EngineHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ReelError::Engine("engine has stopped".to_string()))
    }

    /// Discards all pages and fetches page 1.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Engine`] if the engine task has stopped.
    pub fn load(&self) -> Result<()> {
        self.send(Command::Event(Event::Load))
    }

    /// Fetches the page after the last one.
    ///
    /// Ignored while a page fetch is in flight, at the end of the catalog, or
    /// within the cooldown of the previous accepted call.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Engine`] if the engine task has stopped.
    pub fn load_next_page(&self) -> Result<()> {
        self.send(Command::Event(Event::LoadNextPage))
    }

    /// Replaces the search query.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Engine`] if the engine task has stopped.
    pub fn update_query(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::Event(Event::UpdateQuery(text.into())))
    }

    /// Adds `id` to the favorites if absent, removes it otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Engine`] if the engine task has stopped.
    pub fn toggle_favorite(&self, id: i64) -> Result<()> {
        self.send(Command::Event(Event::ToggleFavorite(id)))
    }

    /// Returns the current view.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Engine`] if the engine task has stopped.
    pub async fn view(&self) -> Result<MovieListView> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::View(tx))?;
        rx.await
            .map_err(|_| ReelError::Engine("engine stopped before answering".to_string()))
    }

    /// Subscribes to view updates.
    ///
    /// The first emission is the current view; after that one view follows
    /// each committed transition. Dropping the subscription unsubscribes.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Engine`] if the engine task has stopped.
    pub async fn subscribe(&self) -> Result<ViewSubscription> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Subscribe(tx))?;
        rx.await
            .map_err(|_| ReelError::Engine("engine stopped before answering".to_string()))
    }

    /// Resolves a poster reference through the catalog.
    #[must_use]
    pub fn resolve_image(&self, reference: &str) -> ImageResource {
        self.catalog.resolve_image(reference)
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("closed", &self.commands.is_closed())
            .finish_non_exhaustive()
    }
}

/// Stream of views published by an engine.
#[derive(Debug)]
pub struct ViewSubscription {
    views: mpsc::UnboundedReceiver<MovieListView>,
}

impl ViewSubscription {
    /// Waits for the next view. Returns `None` once the engine stopped.
    pub async fn next(&mut self) -> Option<MovieListView> {
        self.views.recv().await
    }

    /// Returns a view that is already queued without waiting.
    pub fn try_next(&mut self) -> Option<MovieListView> {
        self.views.try_recv().ok()
    }
}
