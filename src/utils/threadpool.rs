//! Thread pool utilities
use std::sync::mpsc::{Receiver, Sender, SyncSender, channel, sync_channel};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

type Job<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// A fixed-size pool of worker threads.
///
/// The submission queue is bounded to the number of workers, so [ThreadPool::execute]
/// blocks while the pool is saturated. This caps the number of jobs in flight.
/// Results are collected with [ThreadPool::into_results], which waits for every submitted job.
pub struct ThreadPool<T: Send + 'static> {
    sender: Option<SyncSender<Job<T>>>,
    workers: Vec<JoinHandle<()>>,
    results: Receiver<T>,
    size: usize,
}

#[derive(Debug)]
/// Error type for [ThreadPool::execute]
pub struct PoolClosed;

impl std::error::Error for PoolClosed {}

impl std::fmt::Display for PoolClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ThreadPool is closed")
    }
}

impl<T: Send + 'static> ThreadPool<T> {
    /// Get the number of worker threads in the pool.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Create a new thread pool with `size` workers named `<name><id>`.
    pub fn new(size: usize, name: &str) -> Result<Self, std::io::Error> {
        if size == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "worker size must be > 0",
            ));
        }

        let (tx, rx) = sync_channel::<Job<T>>(size);
        let receiver = Arc::new(Mutex::new(rx));
        let (result_tx, result_rx): (Sender<T>, Receiver<T>) = channel();

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let rx = Arc::clone(&receiver);
            let result_tx = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("{}{}", name, id))
                .spawn(move || {
                    loop {
                        let job = {
                            let guard = rx.lock().unwrap_or_else(|err| err.into_inner());
                            guard.recv()
                        };
                        // Err means the pool stopped accepting jobs and the queue is drained.
                        let Ok(job) = job else { break };
                        if result_tx.send(job()).is_err() {
                            break;
                        }
                    }
                })?;
            workers.push(handle);
        }

        Ok(ThreadPool {
            sender: Some(tx),
            workers,
            results: result_rx,
            size,
        })
    }

    /// Submit a job, blocking while the queue is full.
    pub fn execute<F>(&self, job: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolClosed)?;
        sender.send(Box::new(job)).map_err(|_| PoolClosed)
    }

    /// Stop accepting jobs, wait until all submitted jobs have completed, then return their results.
    ///
    /// Results are in completion order. A job that panicked contributes no result.
    pub fn into_results(mut self) -> Vec<T> {
        self.sender.take();
        self.results.iter().collect()
    }
}

impl<T: Send + 'static> Drop for ThreadPool<T> {
    fn drop(&mut self) {
        self.sender.take();
        while let Some(handle) = self.workers.pop() {
            if handle.join().is_err() {
                tracing::error!("A worker thread panicked");
            }
        }
    }
}

#[test]
fn test_thread_pool_results() {
    let pool = ThreadPool::new(3, "test-worker-").unwrap();
    assert_eq!(pool.size(), 3);
    for i in 0..20usize {
        pool.execute(move || i * 2).unwrap();
    }
    let mut results = pool.into_results();
    results.sort();
    assert_eq!(results, (0..20usize).map(|i| i * 2).collect::<Vec<_>>());
}

#[test]
fn test_thread_pool_zero_size() {
    assert!(ThreadPool::<()>::new(0, "test-worker-").is_err());
}
