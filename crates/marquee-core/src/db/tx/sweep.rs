use crate::{
    db::tx::{Connection, Database, RequestId, pool::PooledConnection},
    obs::{MetricsEvent, MetricsSink},
};
use tokio::sync::{
    Mutex,
    mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};
use tracing::{error, warn};

///
/// Orphan
///
/// Connection left behind by a handle that was dropped before resolution.
/// Its transaction may still be open.
///

pub(crate) struct Orphan<D: Database> {
    request_id: RequestId,
    conn: PooledConnection<D>,
}

///
/// OrphanSender
///

pub(crate) struct OrphanSender<D: Database>(UnboundedSender<Orphan<D>>);

impl<D: Database> Clone for OrphanSender<D> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<D: Database> OrphanSender<D> {
    /// Hand a connection to the sweeper. When the sweeper is gone the
    /// connection is dropped, which closes it and frees its pool slot.
    pub(crate) fn send(&self, request_id: RequestId, conn: PooledConnection<D>) {
        warn!(request_id = %request_id, phase = "orphaned", "transaction handle dropped before resolution");
        let _ = self.0.send(Orphan { request_id, conn });
    }
}

///
/// OrphanSweeper
///

pub(crate) struct OrphanSweeper<D: Database> {
    sender: OrphanSender<D>,
    receiver: Mutex<UnboundedReceiver<Orphan<D>>>,
}

impl<D: Database> OrphanSweeper<D> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded_channel();

        Self {
            sender: OrphanSender(tx),
            receiver: Mutex::new(rx),
        }
    }

    pub(crate) fn sender(&self) -> OrphanSender<D> {
        self.sender.clone()
    }

    /// Roll back and release every queued orphan. Returns how many were
    /// swept; a sweep already in progress elsewhere makes this a no-op.
    pub(crate) async fn sweep(&self, sink: &dyn MetricsSink) -> usize {
        let orphans: Vec<Orphan<D>> = {
            let Ok(mut receiver) = self.receiver.try_lock() else {
                return 0;
            };
            std::iter::from_fn(|| receiver.try_recv().ok()).collect()
        };
        let swept = orphans.len();

        for Orphan {
            request_id,
            mut conn,
        } in orphans
        {
            match conn.get_mut().rollback().await {
                Ok(()) => {
                    warn!(request_id = %request_id, phase = "sweep", "rolled back orphaned transaction");
                    sink.record(MetricsEvent::TxRollback);
                    conn.release();
                }
                Err(err) => {
                    error!(request_id = %request_id, phase = "sweep", error = %err, "orphan rollback failed; discarding connection");
                    if let Err(err) = conn.discard().await {
                        error!(request_id = %request_id, phase = "sweep", error = %err, "failed to close orphaned connection");
                    }
                }
            }
            sink.record(MetricsEvent::TxRelease);
            sink.record(MetricsEvent::OrphanSwept);
        }

        swept
    }
}
