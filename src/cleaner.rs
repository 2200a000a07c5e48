use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::store::Store;

/// Background sweep: a dedicated thread that periodically removes
/// expired entries from the recency tail.
///
/// The thread contends for the same lock as user commands, so each tick
/// is a short critical section bounded by the expired tail region.
pub(crate) struct Cleaner {
    stop_tx: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Cleaner {
    pub(crate) fn spawn(store: Arc<Mutex<Store>>, cycle: Duration) -> Cleaner {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("tlru-cleaner".to_string())
            .spawn(move || run(&store, cycle, &stop_rx))
            .expect("failed to spawn cleaner thread");
        Cleaner {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signals the sweep thread and joins it before returning.
    pub(crate) fn stop(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(store: &Mutex<Store>, cycle: Duration, stop_rx: &mpsc::Receiver<()>) {
    tracing::debug!(?cycle, "cleaner started");
    loop {
        match stop_rx.recv_timeout(cycle) {
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let removed = store.lock().sweep_expired();
                if removed > 0 {
                    tracing::debug!(removed, "swept expired entries");
                }
            }
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    tracing::debug!("cleaner stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::time::Instant;

    #[test]
    fn sweeps_expired_tail_entries() {
        let store = Arc::new(Mutex::new(Store::new(10, None)));
        {
            let mut s = store.lock();
            s.insert("dead", Value::Int(1), Some(Instant::now()));
            s.insert("live", Value::Int(2), Some(Instant::now() + Duration::from_secs(60)));
        }
        let cleaner = Cleaner::spawn(store.clone(), Duration::from_millis(20));
        thread::sleep(Duration::from_millis(100));
        cleaner.stop();
        let s = store.lock();
        assert!(s.lookup("dead").is_none());
        assert!(s.lookup("live").is_some());
    }

    #[test]
    fn stop_joins_the_thread() {
        let store = Arc::new(Mutex::new(Store::new(2, None)));
        let cleaner = Cleaner::spawn(store, Duration::from_secs(3600));
        // returns promptly even though the tick period is an hour
        cleaner.stop();
    }
}
