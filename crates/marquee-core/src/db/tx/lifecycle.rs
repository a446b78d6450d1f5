use crate::{
    config::MarqueeConfig,
    db::tx::{
        Connection, Database, Pool, RequestContext, RequestId, SideEffect, SideEffectPolicy,
        TransactionError, TransactionHandle, sweep::OrphanSweeper,
    },
    obs::{MetricsEvent, SharedSink, noop_sink},
};
use std::{
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, warn};

///
/// TransactionLifecycle
///
/// Per-request transaction controller.
///
/// `run` opens a transaction before business logic starts, lets the logic
/// drive it through the `RequestContext`, then makes exactly one decision:
///
/// - `Ok` with the success flag set: commit, then run after-commit effects.
/// - `Ok` without the flag: roll back and fail with `OutcomeNotMarked`.
/// - `Err`: roll back, run compensations, return the error unchanged.
///
/// The connection is released exactly once on every path.
///

pub struct TransactionLifecycle<D: Database> {
    pool: Pool<D>,
    sweeper: Arc<OrphanSweeper<D>>,
    policy: SideEffectPolicy,
    sink: SharedSink,
}

impl<D: Database> Clone for TransactionLifecycle<D> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            sweeper: Arc::clone(&self.sweeper),
            policy: self.policy,
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<D: Database> TransactionLifecycle<D> {
    #[must_use]
    pub fn new(pool: Pool<D>) -> Self {
        Self {
            pool,
            sweeper: Arc::new(OrphanSweeper::new()),
            policy: SideEffectPolicy::default(),
            sink: noop_sink(),
        }
    }

    #[must_use]
    pub fn from_config(database: D, config: &MarqueeConfig) -> Self {
        Self::new(Pool::new(database, &config.pool))
            .with_side_effect_policy(config.transaction.side_effects)
    }

    #[must_use]
    pub const fn with_side_effect_policy(mut self, policy: SideEffectPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_metrics_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn pool(&self) -> &Pool<D> {
        &self.pool
    }

    /// Run `logic` inside a fresh transaction attached to `ctx`.
    ///
    /// Errors raised by `logic` are returned unchanged; lifecycle failures
    /// are converted into `E`.
    pub async fn run<T, E, F>(&self, ctx: &mut RequestContext<D>, logic: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&mut RequestContext<D>) -> Result<T, E>,
        E: From<TransactionError>,
    {
        self.sweep_orphans().await;

        if ctx.has_transaction() {
            return Err(TransactionError::HandleAlreadyAttached.into());
        }
        let handle = self.open(ctx.id()).await?;
        let mut attached = Attached::new(ctx, handle)?;

        let result = logic(&mut *attached.ctx).await;

        let Some(handle) = attached.into_handle() else {
            return Err(TransactionError::HandleMissing.into());
        };

        self.finish(handle, result).await
    }

    async fn open(&self, request_id: RequestId) -> Result<TransactionHandle<D>, TransactionError> {
        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(err) => {
                if matches!(err, TransactionError::ResourceUnavailable { .. }) {
                    self.sink.record(MetricsEvent::PoolExhausted);
                }
                return Err(err);
            }
        };

        if let Err(err) = conn.get_mut().begin().await {
            error!(request_id = %request_id, phase = "begin", error = %err, "failed to begin transaction");
            if let Err(close_err) = conn.discard().await {
                error!(request_id = %request_id, phase = "release", error = %close_err, "failed to close connection");
            }
            return Err(TransactionError::Begin(err));
        }

        self.sink.record(MetricsEvent::TxBegin);
        debug!(request_id = %request_id, phase = "open", "transaction opened");

        Ok(TransactionHandle::new(
            request_id,
            conn,
            self.policy,
            self.sweeper.sender(),
        ))
    }

    async fn finish<T, E>(
        &self,
        mut handle: TransactionHandle<D>,
        result: Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<TransactionError>,
    {
        let request_id = handle.request_id();

        match result {
            Ok(value) if handle.is_success() => match handle.commit().await {
                Ok(()) => {
                    self.sink.record(MetricsEvent::TxCommit);
                    debug!(request_id = %request_id, phase = "commit", "transaction committed");

                    let effects = handle.take_after_commit();
                    self.release(&mut handle, true).await;
                    self.run_after_commit(request_id, effects).await;

                    Ok(value)
                }
                Err(err) => {
                    self.sink.record(MetricsEvent::TxCommitFailed);
                    error!(request_id = %request_id, phase = "commit", error = %err, "commit failed; attempting fallback rollback");

                    let reusable = self.rollback_best_effort(&mut handle).await;
                    self.compensate(&mut handle).await;
                    self.release(&mut handle, reusable).await;

                    Err(TransactionError::Commit(err).into())
                }
            },

            Ok(_) => {
                warn!(request_id = %request_id, phase = "rollback", "business logic completed without marking success");

                let reusable = self.rollback_best_effort(&mut handle).await;
                self.compensate(&mut handle).await;
                self.release(&mut handle, reusable).await;

                Err(TransactionError::OutcomeNotMarked.into())
            }

            Err(err) => {
                warn!(request_id = %request_id, phase = "rollback", "business logic failed; rolling back");

                let reusable = self.rollback_best_effort(&mut handle).await;
                self.compensate(&mut handle).await;
                self.release(&mut handle, reusable).await;

                Err(err)
            }
        }
    }

    /// Roll back, logging instead of raising. Returns whether the connection
    /// is still fit for reuse.
    async fn rollback_best_effort(&self, handle: &mut TransactionHandle<D>) -> bool {
        match handle.rollback().await {
            Ok(()) => {
                self.sink.record(MetricsEvent::TxRollback);
                debug!(request_id = %handle.request_id(), phase = "rollback", "transaction rolled back");
                true
            }
            Err(err) => {
                error!(request_id = %handle.request_id(), phase = "rollback", error = %err, "rollback failed");
                false
            }
        }
    }

    // compensations run newest first
    async fn compensate(&self, handle: &mut TransactionHandle<D>) {
        let request_id = handle.request_id();

        for mut effect in handle.take_compensations().into_iter().rev() {
            let compensated = effect.compensate().await;
            if let Err(err) = compensated {
                error!(request_id = %request_id, phase = "compensate", effect = effect.label(), error = %err, "side effect compensation failed");
            }
        }
    }

    async fn run_after_commit(&self, request_id: RequestId, effects: Vec<Box<dyn SideEffect>>) {
        for mut effect in effects {
            let applied = effect.apply().await;
            if let Err(err) = applied {
                error!(request_id = %request_id, phase = "after_commit", effect = effect.label(), error = %err, "after-commit side effect failed");
            }
        }
    }

    async fn release(&self, handle: &mut TransactionHandle<D>, reusable: bool) {
        let request_id = handle.request_id();
        let Some(conn) = handle.release() else {
            return;
        };

        if reusable {
            conn.release();
        } else if let Err(err) = conn.discard().await {
            error!(request_id = %request_id, phase = "release", error = %err, "failed to close connection");
        }
        self.sink.record(MetricsEvent::TxRelease);
        debug!(request_id = %request_id, phase = "release", "connection released");
    }

    /// Roll back and release connections orphaned by cancelled requests.
    pub async fn sweep_orphans(&self) -> usize {
        self.sweeper.sweep(self.sink.as_ref()).await
    }

    /// Sweep orphans every `interval` on the current runtime.
    ///
    /// The task ends on its own once every clone of this lifecycle is gone.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let sweeper: Weak<OrphanSweeper<D>> = Arc::downgrade(&self.sweeper);
        let sink = Arc::clone(&self.sink);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(sweeper) = sweeper.upgrade() else {
                    break;
                };
                let swept = sweeper.sweep(sink.as_ref()).await;
                if swept > 0 {
                    debug!(swept, "periodic orphan sweep");
                }
            }
        })
    }
}

///
/// Attached
///
/// Keeps a handle attached to its context for the duration of the business
/// logic. If the request future is dropped mid-flight the handle is detached
/// and dropped here, which hands its connection to the orphan sweeper even
/// when the caller keeps the context alive.
///

struct Attached<'a, D: Database> {
    ctx: &'a mut RequestContext<D>,
}

impl<'a, D: Database> Attached<'a, D> {
    fn new(
        ctx: &'a mut RequestContext<D>,
        handle: TransactionHandle<D>,
    ) -> Result<Self, TransactionError> {
        ctx.attach(handle)?;

        Ok(Self { ctx })
    }

    fn into_handle(mut self) -> Option<TransactionHandle<D>> {
        self.ctx.detach()
    }
}

impl<D: Database> Drop for Attached<'_, D> {
    fn drop(&mut self) {
        drop(self.ctx.detach());
    }
}
