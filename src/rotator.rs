use std::time::Duration;

use chrono::{DateTime, Local};
use rand::Rng;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_TICK: Duration = Duration::from_secs(60);

type Action = Box<dyn FnMut(DateTime<Local>) + Send>;

/// One schedulable action with its cooldown and last-fired timestamp.
pub struct RotatorElem {
    cooldown: Duration,
    last: Option<Instant>,
    action: Action,
}

impl RotatorElem {
    /// The action must not panic; errors are its own responsibility to log.
    pub fn new(cooldown: Duration, action: impl FnMut(DateTime<Local>) + Send + 'static) -> Self {
        Self {
            cooldown,
            last: None,
            action: Box::new(action),
        }
    }
}

/// Tick-driven scheduler over cooldown-gated actions. On each tick it fires
/// at most one element, chosen uniformly at random among those whose
/// cooldown has elapsed. This throttles total work to one action per tick
/// and spreads load naturally.
pub struct Rotator {
    tick: Duration,
    elems: Vec<RotatorElem>,
}

impl Rotator {
    pub fn new(tick: Duration) -> Self {
        let tick = if tick.is_zero() { DEFAULT_TICK } else { tick };
        Self {
            tick,
            elems: Vec::new(),
        }
    }

    pub fn add(&mut self, elem: RotatorElem) {
        self.elems.push(elem);
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Drives the schedule until `quit` is cancelled. Consumes the rotator,
    /// so it can only be started once. Panics when started with no elements.
    pub async fn run(mut self, quit: CancellationToken) {
        assert!(!self.elems.is_empty(), "rotator: no elements");
        info!(
            "Rotator started with {} elements, tick {:?}",
            self.elems.len(),
            self.tick
        );
        loop {
            tokio::select! {
                _ = time::sleep(self.tick) => self.on_tick(),
                _ = quit.cancelled() => break,
            }
        }
        info!("Rotator finished");
    }

    fn on_tick(&mut self) {
        let now = Instant::now();
        let ready: Vec<usize> = self
            .elems
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.last
                    .map_or(true, |last| now.duration_since(last) >= e.cooldown)
            })
            .map(|(i, _)| i)
            .collect();
        let chosen = match ready.len() {
            0 => return,
            1 => ready[0],
            n => ready[rand::rng().random_range(0..n)],
        };
        debug!("Rotator firing element {chosen} ({} ready)", ready.len());
        let elem = &mut self.elems[chosen];
        elem.last = Some(now);
        (elem.action)(Local::now());
    }
}
