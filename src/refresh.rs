//! Single-flight refresh scheduling.
//!
//! Triggers come from an initial call, a periodic ticker and an external
//! change signal. At most one collection pass runs at a time; triggers that
//! arrive mid-pass collapse into exactly one follow-up pass. Passes run as
//! tokio tasks, so `trigger` must be called from within a runtime.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::trace;

/// Interval between periodic git refreshes.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Produces the value one pass publishes.
pub trait Collector: Send + Sync + 'static {
    type Output: Send + 'static;

    fn collect(&self) -> impl Future<Output = Self::Output> + Send;
}

/// Callback registered with a [`ChangeSignal`].
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Source of "state changed" notifications, e.g. a branch switch.
pub trait ChangeSignal: Send + Sync {
    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// Registration handle. Unsubscribes exactly once, on [`Subscription::unsubscribe`] or drop.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// In-process [`ChangeSignal`] that fans out to every subscriber.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    table: Arc<Mutex<ListenerTable>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every current listener. Listeners run outside the table lock.
    pub fn notify(&self) {
        let listeners: Vec<Listener> = lock(&self.table)
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.table).listeners.len()
    }
}

impl ChangeSignal for ChangeNotifier {
    fn subscribe(&self, listener: Listener) -> Subscription {
        let id = {
            let mut table = lock(&self.table);
            let id = table.next_id;
            table.next_id += 1;
            table.listeners.push((id, listener));
            id
        };
        let table = Arc::downgrade(&self.table);
        Subscription::new(move || {
            if let Some(table) = table.upgrade() {
                lock(&table).listeners.retain(|(other, _)| *other != id);
            }
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Collecting { queued: bool },
    Disposed,
}

type Publish<T> = Box<dyn Fn(T) + Send + Sync>;

struct Shared<C: Collector> {
    collector: C,
    state: Mutex<State>,
    publish: Publish<C::Output>,
}

impl<C: Collector> Shared<C> {
    fn trigger(self: &Arc<Self>) {
        {
            let mut state = lock(&self.state);
            match *state {
                State::Disposed => return,
                State::Collecting { .. } => {
                    trace!("refresh requested mid-pass, queueing one rerun");
                    *state = State::Collecting { queued: true };
                    return;
                }
                State::Idle => *state = State::Collecting { queued: false },
            }
        }
        let shared = Arc::clone(self);
        tokio::spawn(async move { shared.run_passes().await });
    }

    async fn run_passes(&self) {
        loop {
            let output = self.collector.collect().await;

            if *lock(&self.state) == State::Disposed {
                trace!("discarding pass result after dispose");
                return;
            }
            // The state stays `Collecting` while publishing, so a callback that
            // triggers again only queues a rerun. The lock is not held here.
            (self.publish)(output);

            let mut state = lock(&self.state);
            match *state {
                State::Collecting { queued: true } => *state = State::Collecting { queued: false },
                State::Collecting { queued: false } => {
                    *state = State::Idle;
                    return;
                }
                State::Disposed | State::Idle => return,
            }
        }
    }
}

/// Cloneable trigger that does not keep the scheduler alive.
pub struct RefreshHandle<C: Collector> {
    shared: Weak<Shared<C>>,
}

impl<C: Collector> Clone for RefreshHandle<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<C: Collector> RefreshHandle<C> {
    pub fn trigger(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.trigger();
        }
    }
}

/// Owns the ticker task and signal subscription for one collector.
pub struct RefreshScheduler<C: Collector> {
    shared: Arc<Shared<C>>,
    ticker: Option<JoinHandle<()>>,
    subscription: Option<Subscription>,
}

impl<C: Collector> RefreshScheduler<C> {
    /// Create the scheduler without starting anything.
    pub fn new(collector: C, publish: impl Fn(C::Output) + Send + Sync + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                collector,
                state: Mutex::new(State::Idle),
                publish: Box::new(publish),
            }),
            ticker: None,
            subscription: None,
        }
    }

    /// Start the ticker, subscribe to `signal`, and run the first pass.
    pub fn start(
        collector: C,
        period: Duration,
        signal: Option<&dyn ChangeSignal>,
        publish: impl Fn(C::Output) + Send + Sync + 'static,
    ) -> Self {
        let mut scheduler = Self::new(collector, publish);
        scheduler.ticker = Some(scheduler.spawn_ticker(period));
        if let Some(signal) = signal {
            let handle = scheduler.handle();
            scheduler.subscription = Some(signal.subscribe(Arc::new(move || handle.trigger())));
        }
        scheduler.trigger();
        scheduler
    }

    fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let handle = self.handle();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                handle.trigger();
            }
        })
    }

    pub fn trigger(&self) {
        self.shared.trigger();
    }

    pub fn handle(&self) -> RefreshHandle<C> {
        RefreshHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn is_disposed(&self) -> bool {
        *lock(&self.shared.state) == State::Disposed
    }

    /// Stop the ticker, detach from the signal, and drop any in-flight result.
    ///
    /// Takes effect synchronously: no pass starts afterwards, and a result that
    /// has not reached `publish` yet is dropped.
    pub fn dispose(&mut self) {
        *lock(&self.shared.state) = State::Disposed;
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl<C: Collector> Drop for RefreshScheduler<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}
