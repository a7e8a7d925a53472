use std::path::PathBuf;
use std::sync::mpsc::{sync_channel, Receiver};
use std::thread::JoinHandle;

use log::debug;

use crate::error::{Error, Result};
use crate::file::FileState;

/// Prepares upcoming files on background workers so the active reader never
/// stalls on a metadata parse or page scan.
///
/// Each worker holds at most one prepared [`FileState`] in its channel, so
/// live descriptor memory stays proportional to the worker count rather than
/// the fleet of files.
pub struct Fleet {
    receivers: Vec<Receiver<Result<FileState>>>,
    workers: Vec<JoinHandle<()>>,
    delivered: usize,
    total: usize,
}

impl Fleet {
    /// Spawns up to `workers` threads preparing `paths`. Prepared files are
    /// handed back in the order given, regardless of which worker finished
    /// first.
    pub fn spawn(paths: Vec<PathBuf>, workers: usize) -> Self {
        let worker_count = workers.clamp(1, paths.len().max(1));
        let mut receivers = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let assigned: Vec<PathBuf> = paths
                .iter()
                .skip(worker)
                .step_by(worker_count)
                .cloned()
                .collect();
            let (sender, receiver) = sync_channel(1);
            let handle = std::thread::spawn(move || {
                for path in assigned {
                    debug!("preparing {}", path.display());
                    let state = FileState::prepare(&path);
                    if sender.send(state).is_err() {
                        // the consumer is gone
                        return;
                    }
                }
            });
            receivers.push(receiver);
            handles.push(handle);
        }
        Self {
            receivers,
            workers: handles,
            delivered: 0,
            total: paths.len(),
        }
    }

    /// The next prepared file, in input order. Blocks until a worker has it
    /// ready.
    pub fn next_file(&mut self) -> Option<Result<FileState>> {
        if self.delivered == self.total {
            return None;
        }
        let worker = self.delivered % self.receivers.len();
        self.delivered += 1;
        match self.receivers[worker].recv() {
            Ok(state) => Some(state),
            Err(_) => Some(Err(Error::Io(
                "prefetch worker disconnected".to_string(),
            ))),
        }
    }

    /// How many files have not been handed out yet.
    pub fn remaining(&self) -> usize {
        self.total - self.delivered
    }
}

impl Drop for Fleet {
    fn drop(&mut self) {
        self.receivers.clear();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
