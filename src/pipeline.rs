use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dedup::SyncDeduplicator;
use crate::filter::{choose_filters, Filter};
use crate::guard::Guard;
use crate::matcher::Expr;
use crate::rotator::{Rotator, RotatorElem, DEFAULT_TICK};
use crate::traits::{ItemSink, Publisher, Source};
use crate::types::{Item, Result, RouterError};

pub const DEFAULT_CHAN_SIZE: usize = 1024;
pub const DEFAULT_DEDUP_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Building,
    Running,
    Stopped,
}

struct SourceSlot {
    source: Arc<dyn Source>,
    /// Keeps at most one poll of this source in flight.
    guard: Arc<Guard>,
}

struct CompiledFilter {
    filter: Filter,
    expr: Expr,
    /// Publisher names this filter feeds, resolved at start.
    pub_names: Vec<String>,
}

/// News filtering pipeline: sources are polled by a rotator, items flow
/// through a shared producer queue into a single dispatch task that matches
/// filters, deduplicates, and fans out to per-publisher queues.
///
/// All sources, publishers, and filters are registered before `start`; the
/// registries are read-only afterwards.
pub struct Pipeline {
    chan_size: usize,
    tick: Duration,
    dedup: Arc<SyncDeduplicator>,
    sources: HashMap<String, SourceSlot>,
    pubs: HashMap<String, Box<dyn Publisher>>,
    filters: Vec<CompiledFilter>,
    state: State,
    quit: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// `chan_size` is the per-publisher queue capacity; the shared producer
    /// queue gets twice that.
    pub fn new(chan_size: usize, dedup: impl Into<SyncDeduplicator>) -> Self {
        Self {
            chan_size,
            tick: DEFAULT_TICK,
            dedup: Arc::new(dedup.into()),
            sources: HashMap::new(),
            pubs: HashMap::new(),
            filters: Vec::new(),
            state: State::Building,
            quit: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    fn ensure_building(&self) -> Result<()> {
        if self.state != State::Building {
            return Err(RouterError::Pipeline(
                "pipeline can only be modified before it is started".into(),
            ));
        }
        Ok(())
    }

    pub fn add_source(&mut self, source: Arc<dyn Source>) -> Result<()> {
        self.ensure_building()?;
        let name = source.info().name.clone();
        if self.sources.contains_key(&name) {
            return Err(RouterError::DuplicateSource(name));
        }
        self.sources.insert(
            name,
            SourceSlot {
                source,
                guard: Arc::new(Guard::new()),
            },
        );
        Ok(())
    }

    pub fn add_publisher(&mut self, publisher: Box<dyn Publisher>) -> Result<()> {
        self.ensure_building()?;
        let name = publisher.info().name.clone();
        if self.pubs.contains_key(&name) {
            return Err(RouterError::DuplicatePublisher(name));
        }
        self.pubs.insert(name, publisher);
        Ok(())
    }

    /// Compiles the filter's condition; a malformed condition fails the call
    /// and the filter is not registered.
    pub fn add_filter(&mut self, filter: Filter) -> Result<()> {
        self.ensure_building()?;
        if filter.cond.trim().is_empty() {
            return Err(RouterError::Condition("empty filter condition".into()));
        }
        let expr = Expr::new(&filter.cond)?;
        self.filters.push(CompiledFilter {
            filter,
            expr,
            pub_names: Vec::new(),
        });
        Ok(())
    }

    /// Launches the pipeline. Prunes sources and publishers no filter
    /// routes, then spawns the publisher loops, the rotator, and the
    /// dispatch task. A failure leaves the pipeline unusable.
    pub fn start(&mut self) -> Result<()> {
        if self.state != State::Building {
            return Err(RouterError::Pipeline("pipeline already started".into()));
        }
        if let Err(e) = self.prepare() {
            self.state = State::Stopped;
            return Err(e);
        }
        info!(
            "Starting pipeline: {} sources, {} publishers, {} filters, tick {:?}",
            self.sources.len(),
            self.pubs.len(),
            self.filters.len(),
            self.tick
        );
        self.launch();
        self.state = State::Running;
        Ok(())
    }

    fn prepare(&mut self) -> Result<()> {
        if self.filters.is_empty() {
            return Err(RouterError::Pipeline("no filters".into()));
        }

        let filters = &self.filters;
        self.sources.retain(|name, slot| {
            let indices =
                choose_filters(filters, |f| f.filter.match_src(slot.source.info()));
            if indices.is_empty() {
                info!("Pruning source '{name}': no filter selects it");
                return false;
            }
            true
        });
        if self.sources.is_empty() {
            return Err(RouterError::Pipeline("no sources".into()));
        }

        let filters = &mut self.filters;
        self.pubs.retain(|name, publisher| {
            let indices = choose_filters(filters, |f| f.filter.match_pub(publisher.info()));
            if indices.is_empty() {
                info!("Pruning publisher '{name}': no filter targets it");
                return false;
            }
            for i in indices {
                filters[i].pub_names.push(name.clone());
            }
            true
        });
        if self.pubs.is_empty() {
            return Err(RouterError::Pipeline("no publishers".into()));
        }
        Ok(())
    }

    fn launch(&mut self) {
        let (prod_tx, prod_rx) = mpsc::channel::<Arc<Item>>(2 * self.chan_size);

        let mut pub_txs = HashMap::new();
        for (name, publisher) in std::mem::take(&mut self.pubs) {
            let (tx, rx) = mpsc::channel::<Arc<Item>>(self.chan_size);
            pub_txs.insert(name, tx);
            self.tasks.push(tokio::spawn(async move {
                publisher.publish(rx).await;
            }));
        }

        let mut rotator = Rotator::new(self.tick);
        let mut source_names = HashSet::new();
        for (name, slot) in std::mem::take(&mut self.sources) {
            source_names.insert(name);
            let info = slot.source.info().clone();
            let sink = ItemSink::new(prod_tx.clone(), info.categories.clone());
            let source = slot.source;
            let guard = slot.guard;
            rotator.add(RotatorElem::new(info.cooldown, move |now| {
                if info.mute_interval.contains_hour(now.hour()) {
                    return;
                }
                let source = Arc::clone(&source);
                let sink = sink.clone();
                let started = guard.spawn(async move {
                    if let Err(e) = source.receive(&sink).await {
                        error!("Source '{}' poll failed: {e}", source.info().name);
                    }
                });
                if !started {
                    debug!("Source '{}' poll still in flight, skipping", info.name);
                }
            }));
        }
        // The sinks inside the rotator elements hold the only producer
        // senders now; when the rotator quits and in-flight polls finish,
        // the channel closes and the dispatch task drains out.
        drop(prod_tx);

        self.tasks.push(tokio::spawn(rotator.run(self.quit.clone())));

        let dispatcher = Dispatcher {
            filters: std::mem::take(&mut self.filters),
            source_names,
            pub_txs,
            dedup: Arc::clone(&self.dedup),
        };
        self.tasks.push(tokio::spawn(dispatcher.run(prod_rx)));
    }

    /// Signals the rotator to quit; queue closure then cascades through the
    /// dispatch task to every publisher loop. Polls already in flight run to
    /// completion and their output is still dispatched.
    pub fn stop(&mut self) {
        if self.state != State::Running {
            return;
        }
        info!("Stopping pipeline");
        self.quit.cancel();
        self.state = State::Stopped;
    }

    /// Blocks until every spawned task has completed.
    pub async fn wait(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                error!("Pipeline task failed: {e}");
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(
            DEFAULT_CHAN_SIZE,
            crate::dedup::Deduplicator::new(DEFAULT_DEDUP_SIZE),
        )
    }
}

struct Dispatcher {
    filters: Vec<CompiledFilter>,
    source_names: HashSet<String>,
    pub_txs: HashMap<String, mpsc::Sender<Arc<Item>>>,
    dedup: Arc<SyncDeduplicator>,
}

impl Dispatcher {
    async fn run(self, mut rx: mpsc::Receiver<Arc<Item>>) {
        while let Some(item) = rx.recv().await {
            self.route(item);
        }
        info!("Dispatch loop finished");
    }

    fn route(&self, item: Arc<Item>) {
        // An item from a source that was never registered means the dispatch
        // bookkeeping is corrupt. Not recoverable; take the process down.
        if !self.source_names.contains(&item.src.name) {
            error!("Item from unregistered source '{}' (bug)", item.src.name);
            std::process::exit(1);
        }

        let mut targets: HashSet<&str> = HashSet::new();
        let mut matched = false;
        for f in &self.filters {
            if f.expr.match_words(item.words()) {
                matched = true;
                for name in &f.pub_names {
                    targets.insert(name.as_str());
                }
            }
        }
        if !matched {
            return;
        }
        if !self.dedup.keep(item.key()) {
            debug!("Duplicate dropped: '{}' ({})", item.title, item.key());
            return;
        }
        for name in targets {
            let Some(tx) = self.pub_txs.get(name) else {
                continue;
            };
            match tx.try_send(Arc::clone(&item)) {
                Ok(()) => info!(
                    "Sent '{}' to publisher '{}' (src {})",
                    item.title, name, item.src.name
                ),
                Err(TrySendError::Full(_)) => warn!(
                    "Publisher '{}' queue full, dropping '{}'",
                    name, item.title
                ),
                Err(TrySendError::Closed(_)) => warn!(
                    "Publisher '{}' queue closed, dropping '{}'",
                    name, item.title
                ),
            }
        }
    }
}
