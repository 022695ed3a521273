use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam::channel::{bounded, Receiver, Sender};
use log::*;
use rayon::prelude::*;

use super::types::{RegionChunk, RegionProcessor, CHANNEL_SIZE_MODIFIER};
use crate::core::error::{Result, WhamError};

/// Parallel chunk executor driven by a [`RegionProcessor`].
///
/// Chunks are processed on a dedicated Rayon pool in no particular order; each
/// item a processor emits is sent over a bounded crossbeam channel to the single
/// consumer holding the [`ParGrangesHandle`].
#[derive(Debug)]
pub struct ParGranges<R: 'static + RegionProcessor + Send + Sync> {
    chunks: Vec<RegionChunk>,
    threads: usize,
    channel_size_modifier: usize,
    pool: rayon::ThreadPool,
    processor: R,
}

/// Totals reported once every chunk has been attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub chunks_total: usize,
    pub chunks_failed: usize,
}

/// Consumer side of a running [`ParGranges`].
pub struct ParGrangesHandle<P> {
    receiver: Receiver<P>,
    worker: thread::JoinHandle<Result<RunSummary>>,
}

impl<P> ParGrangesHandle<P> {
    pub fn receiver(&self) -> &Receiver<P> {
        &self.receiver
    }

    /// Wait for the workers; a fatal chunk error is returned here.
    pub fn join(self) -> Result<RunSummary> {
        drop(self.receiver);
        self.worker
            .join()
            .map_err(|_| WhamError::Scoring("worker pool panicked".to_string()))?
    }
}

impl<R: 'static + RegionProcessor + Send + Sync> ParGranges<R> {
    /// Create a new [`ParGranges`] executor over a prebuilt chunk list.
    pub fn new(
        chunks: Vec<RegionChunk>,
        threads: Option<usize>,
        channel_size_modifier: Option<usize>,
        processor: R,
    ) -> Result<Self> {
        let requested_threads = threads.unwrap_or_else(num_cpus::get);
        let threads = std::cmp::max(requested_threads, 1);
        info!("Using {} worker threads.", threads);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| WhamError::Config(format!("Failed to build Rayon thread pool: {}", e)))?;

        Ok(Self {
            chunks,
            threads,
            channel_size_modifier: channel_size_modifier
                .unwrap_or(CHANNEL_SIZE_MODIFIER)
                .max(1),
            pool,
            processor,
        })
    }

    /// Launch parallel processing for all chunks.
    pub fn process(self) -> Result<ParGrangesHandle<R::P>> {
        let ParGranges {
            chunks,
            threads,
            channel_size_modifier,
            pool,
            processor,
        } = self;

        let channel_size = threads.saturating_mul(channel_size_modifier);
        info!(
            "Creating channel of length {} for {} chunks",
            channel_size,
            chunks.len()
        );

        let engine = Engine { chunks, processor };
        let (sender, receiver) = bounded::<R::P>(channel_size);
        let worker = thread::spawn(move || pool.install(move || engine.run(sender)));
        Ok(ParGrangesHandle { receiver, worker })
    }
}

struct Engine<R: RegionProcessor + Send + Sync> {
    chunks: Vec<RegionChunk>,
    processor: R,
}

impl<R: RegionProcessor + Send + Sync> Engine<R> {
    fn run(self, sender: Sender<R::P>) -> Result<RunSummary> {
        let total_chunks = self.chunks.len();
        let processed_chunks = AtomicUsize::new(0);
        let failed_chunks = AtomicUsize::new(0);
        let log_step = std::cmp::max(1, total_chunks / 10);

        self.chunks
            .par_iter()
            .try_for_each_with(sender, |snd, chunk| -> Result<()> {
                trace!("Processing {}", chunk);
                let mut closed = false;
                let outcome = self.processor.process_region(chunk, &mut |item| {
                    if !closed && snd.send(item).is_err() {
                        warn!("Channel closed; dropping remaining output");
                        closed = true;
                    }
                });

                let completed = processed_chunks.fetch_add(1, Ordering::Relaxed) + 1;
                if completed == total_chunks || completed % log_step == 0 {
                    let percent = (completed as f64 / total_chunks as f64) * 100.0;
                    info!(
                        "Processed {:.1}% ({} / {} chunks)",
                        percent, completed, total_chunks
                    );
                }

                match outcome {
                    Ok(()) => Ok(()),
                    Err(err) if !err.is_fatal() => {
                        warn!("{}", err);
                        failed_chunks.fetch_add(1, Ordering::Relaxed);
                        Ok(())
                    }
                    Err(err) => {
                        error!("Fatal error in {}: {}", chunk, err);
                        Err(err)
                    }
                }
            })?;

        Ok(RunSummary {
            chunks_total: total_chunks,
            chunks_failed: failed_chunks.load(Ordering::Relaxed),
        })
    }
}
