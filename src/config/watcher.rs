//! Configuration file watcher for hot reload.
//!
//! # States
//! ```text
//! Idle → Watching: start() subscribes to the parent directory (non-recursive)
//! Watching → Idle: stop() drops the subscription (no-op when Idle)
//! ```
//!
//! # Design Decisions
//! - Construction performs one synchronous load and fails if it fails
//! - Events arrive on the event source's thread; readers never block
//! - A reload swaps the whole `Arc<ParsedConfig>` or leaves it untouched
//! - Reloads are serialized so the last swap reflects the last file read
//! - Event delivery is an injected capability (`EventSource`)

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value;

use crate::config::error::ConfigResult;
use crate::config::loader::ConfigLoader;
use crate::config::value::ParsedConfig;
use crate::parsers::Format;

/// Shared, live-readable configuration.
pub type ConfigHandle = Arc<ArcSwap<ParsedConfig>>;

/// Invoked with the path of every modified entry in a watched directory.
pub type EventCallback = Arc<dyn Fn(&Path) + Send + Sync>;

/// Keeps a subscription alive; dropping it unsubscribes.
pub struct Subscription {
    _guard: Box<dyn Send>,
}

impl Subscription {
    pub fn new<G: Send + 'static>(guard: G) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

/// Delivers file modification events for a directory.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, dir: &Path, on_modified: EventCallback) -> ConfigResult<Subscription>;
}

/// Event source backed by the OS file-watching facility.
#[derive(Debug, Clone)]
pub struct NotifyEventSource {
    poll_interval: Duration,
}

impl NotifyEventSource {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for NotifyEventSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl EventSource for NotifyEventSource {
    fn subscribe(&self, dir: &Path, on_modified: EventCallback) -> ConfigResult<Subscription> {
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                // Editors often replace the file instead of writing in place.
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    for path in &event.paths {
                        on_modified(path);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        Ok(Subscription::new(watcher))
    }
}

type WeakCallback = Weak<dyn Fn(&Path) + Send + Sync>;

/// Event source driven by explicit [`emit`](ManualEventSource::emit) calls.
///
/// Useful for signal-triggered reloads and for tests.
#[derive(Clone, Default)]
pub struct ManualEventSource {
    subscribers: Arc<Mutex<Vec<(PathBuf, WeakCallback)>>>,
}

impl ManualEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `path` as modified to every live subscriber of its directory.
    pub fn emit(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            Some(_) => Path::new("."),
            None => return,
        };
        let canonical_parent = std::fs::canonicalize(parent).ok();

        let callbacks: Vec<_> = {
            let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
            subscribers.retain(|(_, cb)| cb.strong_count() > 0);
            subscribers
                .iter()
                .filter(|(dir, _)| dir == parent || canonical_parent.as_deref() == Some(dir.as_path()))
                .filter_map(|(_, cb)| cb.upgrade())
                .collect()
        };

        for callback in callbacks {
            callback(path);
        }
    }

    /// Number of subscriptions still alive.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, cb)| cb.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for ManualEventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualEventSource")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventSource for ManualEventSource {
    fn subscribe(&self, dir: &Path, on_modified: EventCallback) -> ConfigResult<Subscription> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((dir.to_path_buf(), Arc::downgrade(&on_modified)));
        Ok(Subscription::new(on_modified))
    }
}

/// Observation state of a [`ConfigWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Watching,
}

struct WatchState {
    path: PathBuf,
    canonical: PathBuf,
    loader: ConfigLoader,
    config: ConfigHandle,
    reload_lock: Mutex<()>,
}

impl WatchState {
    fn is_target(&self, path: &Path) -> bool {
        path == self.path
            || path == self.canonical
            || std::fs::canonicalize(path).is_ok_and(|p| p == self.canonical)
    }

    fn on_modified(&self, path: &Path) {
        if !self.is_target(path) {
            return;
        }
        tracing::info!(path = %self.path.display(), "Config file change detected, reloading...");
        let _ = self.reload();
    }

    fn reload(&self) -> ConfigResult<Arc<ParsedConfig>> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.loader.try_load(&self.path) {
            Ok(config) => {
                let config = Arc::new(config);
                self.config.store(Arc::clone(&config));
                tracing::info!(path = %self.path.display(), "Configuration reloaded");
                Ok(config)
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    "Failed to reload config: {}. Keeping current configuration.",
                    e
                );
                Err(e)
            }
        }
    }
}

/// Keeps a live configuration in sync with a file.
pub struct ConfigWatcher {
    state: Arc<WatchState>,
    source: Arc<dyn EventSource>,
    subscription: Option<Subscription>,
}

impl ConfigWatcher {
    /// Load `path` as `format` and prepare to watch it with the OS event source.
    pub fn new(path: impl AsRef<Path>, format: Format, schema: Option<Value>) -> ConfigResult<Self> {
        let mut loader = ConfigLoader::new().format(format);
        if let Some(schema) = schema {
            loader = loader.schema(schema);
        }
        Self::with_loader(path, loader, Arc::new(NotifyEventSource::default()))
    }

    /// Like [`new`](Self::new), detecting the format from the path.
    pub fn for_path(path: impl AsRef<Path>, schema: Option<Value>) -> ConfigResult<Self> {
        let format = Format::detect(path.as_ref())?;
        Self::new(path, format, schema)
    }

    /// Build a watcher from an explicit pipeline and event source.
    pub fn with_loader(
        path: impl AsRef<Path>,
        loader: ConfigLoader,
        source: Arc<dyn EventSource>,
    ) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let initial = loader.load(&path)?;
        let canonical = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());

        Ok(Self {
            state: Arc::new(WatchState {
                path,
                canonical,
                loader,
                config: Arc::new(ArcSwap::from_pointee(initial)),
                reload_lock: Mutex::new(()),
            }),
            source,
            subscription: None,
        })
    }

    /// Begin reacting to modification events. No-op when already watching.
    pub fn start(&mut self) -> ConfigResult<()> {
        if self.subscription.is_some() {
            return Ok(());
        }

        let dir = match self.state.canonical.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let weak = Arc::downgrade(&self.state);
        let callback: EventCallback = Arc::new(move |path: &Path| {
            if let Some(state) = weak.upgrade() {
                state.on_modified(path);
            }
        });

        self.subscription = Some(self.source.subscribe(&dir, callback)?);
        tracing::info!(path = ?self.state.path, "Config watcher started");
        Ok(())
    }

    /// Stop reacting to events. No-op when idle.
    pub fn stop(&mut self) {
        if self.subscription.take().is_some() {
            tracing::info!(path = ?self.state.path, "Config watcher stopped");
        }
    }

    pub fn state(&self) -> WatcherState {
        if self.subscription.is_some() {
            WatcherState::Watching
        } else {
            WatcherState::Idle
        }
    }

    pub fn is_watching(&self) -> bool {
        self.state() == WatcherState::Watching
    }

    /// Snapshot of the current configuration.
    pub fn current(&self) -> Arc<ParsedConfig> {
        self.state.config.load_full()
    }

    /// Shared handle that always observes the latest successful load.
    pub fn handle(&self) -> ConfigHandle {
        Arc::clone(&self.state.config)
    }

    /// Re-run the pipeline now. On failure the current configuration is kept.
    pub fn reload(&self) -> ConfigResult<Arc<ParsedConfig>> {
        self.state.reload()
    }

    pub fn path(&self) -> &Path {
        &self.state.path
    }
}

impl fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigWatcher")
            .field("path", &self.state.path)
            .field("state", &self.state())
            .finish()
    }
}
