//! The distributed-memory axis (spec.md §9'). `Communicator` models the
//! collective operations the coordinator needs; `LocalCommunicator`
//! simulates `size()` ranks as OS threads within one process, connected
//! by `mpsc` channels, so no rank ever reads another rank's memory
//! directly.

use forest_core::Dataset;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Barrier};

pub type SerializedTree = Vec<u8>;

/// One rank's contribution to the final gather: the predictions of
/// every tree it trained, each aligned to the broadcast test set.
#[derive(Debug, Clone)]
pub struct LocalPredictions {
    pub rank: usize,
    pub tree_predictions: Vec<Vec<i32>>,
}

/// Collective operations a rank can perform against its peers
/// (spec.md §9' `Communicator`). All calls block until the collective
/// completes; there is no cancellation (spec.md §5 "Cancellation &
/// timeouts: None").
pub trait Communicator: Send + Sync {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn barrier(&self);
    /// Rank 0 supplies `Some(dataset)`; every other rank passes `None`
    /// and receives rank 0's copy.
    fn broadcast_dataset(&self, data: Option<Dataset>) -> Dataset;
    /// Every rank calls with its own contribution. Only rank 0's return
    /// value is populated (one entry per rank, rank 0 first); other
    /// ranks get an empty vec back.
    fn gather_predictions(&self, local: LocalPredictions) -> Vec<LocalPredictions>;
    /// Same gather semantics as `gather_predictions`, for serialized
    /// per-rank tree buffers.
    fn gather_trees(&self, local: Vec<SerializedTree>) -> Vec<Vec<SerializedTree>>;
    /// Reduces each rank's elapsed time to the maximum (spec.md §5,
    /// used for wall-clock speedup/efficiency). Only rank 0's return
    /// value is the true max; other ranks get their own local value
    /// back since nothing downstream of them needs the reduction.
    fn reduce_max_time(&self, local_secs: f64) -> f64;
}

pub struct LocalCommunicator {
    rank: usize,
    size: usize,
    barrier: Arc<Barrier>,
    broadcast_tx: Vec<Sender<Dataset>>,
    broadcast_rx: Option<Receiver<Dataset>>,
    pred_tx: Option<Sender<LocalPredictions>>,
    pred_rx: Vec<Receiver<LocalPredictions>>,
    trees_tx: Option<Sender<Vec<SerializedTree>>>,
    trees_rx: Vec<Receiver<Vec<SerializedTree>>>,
    time_tx: Option<Sender<f64>>,
    time_rx: Vec<Receiver<f64>>,
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.barrier.wait();
    }

    fn broadcast_dataset(&self, data: Option<Dataset>) -> Dataset {
        if self.rank == 0 {
            let data = data.expect("rank 0 must supply the dataset to broadcast");
            for tx in &self.broadcast_tx {
                tx.send(data.clone()).expect("peer rank disconnected before broadcast");
            }
            data
        } else {
            self.broadcast_rx
                .as_ref()
                .expect("non-root rank missing broadcast receiver")
                .recv()
                .expect("root rank disconnected before broadcast")
        }
    }

    fn gather_predictions(&self, local: LocalPredictions) -> Vec<LocalPredictions> {
        if self.rank == 0 {
            let mut all = Vec::with_capacity(self.size);
            all.push(local);
            for rx in &self.pred_rx {
                all.push(rx.recv().expect("peer rank disconnected before gather"));
            }
            all
        } else {
            self.pred_tx
                .as_ref()
                .expect("non-root rank missing predictions sender")
                .send(local)
                .expect("root rank disconnected before gather");
            Vec::new()
        }
    }

    fn gather_trees(&self, local: Vec<SerializedTree>) -> Vec<Vec<SerializedTree>> {
        if self.rank == 0 {
            let mut all = Vec::with_capacity(self.size);
            all.push(local);
            for rx in &self.trees_rx {
                all.push(rx.recv().expect("peer rank disconnected before gather"));
            }
            all
        } else {
            self.trees_tx
                .as_ref()
                .expect("non-root rank missing trees sender")
                .send(local)
                .expect("root rank disconnected before gather");
            Vec::new()
        }
    }

    fn reduce_max_time(&self, local_secs: f64) -> f64 {
        if self.rank == 0 {
            let mut max = local_secs;
            for rx in &self.time_rx {
                max = max.max(rx.recv().expect("peer rank disconnected before time reduce"));
            }
            max
        } else {
            self.time_tx
                .as_ref()
                .expect("non-root rank missing time sender")
                .send(local_secs)
                .expect("root rank disconnected before time reduce");
            local_secs
        }
    }
}

/// Spawns `size` OS threads, one rank each, runs `f` on every rank, and
/// returns every rank's result once all have joined. Rank 0 runs the
/// same closure as every other rank; it is only privileged in that the
/// `Communicator` hands it the gathered/broadcast values.
pub fn run_ranks<F, T>(size: usize, f: F) -> Vec<T>
where
    F: Fn(LocalCommunicator) -> T + Sync,
    T: Send,
{
    assert!(size >= 1, "size must be at least 1");
    let barrier = Arc::new(Barrier::new(size));

    let mut broadcast_tx = Vec::with_capacity(size.saturating_sub(1));
    let mut broadcast_rx_by_rank: Vec<Option<Receiver<Dataset>>> = (0..size).map(|_| None).collect();
    let mut pred_tx_by_rank: Vec<Option<Sender<LocalPredictions>>> = (0..size).map(|_| None).collect();
    let mut pred_rx = Vec::with_capacity(size.saturating_sub(1));
    let mut trees_tx_by_rank: Vec<Option<Sender<Vec<SerializedTree>>>> = (0..size).map(|_| None).collect();
    let mut trees_rx = Vec::with_capacity(size.saturating_sub(1));
    let mut time_tx_by_rank: Vec<Option<Sender<f64>>> = (0..size).map(|_| None).collect();
    let mut time_rx = Vec::with_capacity(size.saturating_sub(1));

    for rank in 1..size {
        let (tx, rx) = mpsc::channel();
        broadcast_tx.push(tx);
        broadcast_rx_by_rank[rank] = Some(rx);

        let (tx, rx) = mpsc::channel();
        pred_tx_by_rank[rank] = Some(tx);
        pred_rx.push(rx);

        let (tx, rx) = mpsc::channel();
        trees_tx_by_rank[rank] = Some(tx);
        trees_rx.push(rx);

        let (tx, rx) = mpsc::channel();
        time_tx_by_rank[rank] = Some(tx);
        time_rx.push(rx);
    }

    let mut comms = Vec::with_capacity(size);
    comms.push(LocalCommunicator {
        rank: 0,
        size,
        barrier: barrier.clone(),
        broadcast_tx,
        broadcast_rx: None,
        pred_tx: None,
        pred_rx,
        trees_tx: None,
        trees_rx,
        time_tx: None,
        time_rx,
    });
    for rank in 1..size {
        comms.push(LocalCommunicator {
            rank,
            size,
            barrier: barrier.clone(),
            broadcast_tx: Vec::new(),
            broadcast_rx: broadcast_rx_by_rank[rank].take(),
            pred_tx: pred_tx_by_rank[rank].take(),
            pred_rx: Vec::new(),
            trees_tx: trees_tx_by_rank[rank].take(),
            trees_rx: Vec::new(),
            time_tx: time_tx_by_rank[rank].take(),
            time_rx: Vec::new(),
        });
    }

    let f_ref = &f;
    std::thread::scope(|scope| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| scope.spawn(move || f_ref(comm)))
            .collect();
        handles.into_iter().map(|h| h.join().expect("rank thread panicked")).collect()
    })
}
