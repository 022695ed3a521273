//! Region processor tying chunk scans to indexed BAM readers.
//!
//! [`BreakpointProcessor`] implements [`RegionProcessor`] so the par_granges
//! scheduler can scan chunks in parallel. For each chunk it fetches the region
//! from every sample's file, merges the per-sample streams through the pileup,
//! scores triggered sites, and emits VCF-like text in batches.

use std::path::Path;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use rust_htslib::bam::{self, Read};

use crate::breakpoint::site::{score_site, ScanContext};
use crate::core::error::{Result, WhamError};
use crate::core::read_filter::DefaultReadFilter;
use crate::core::retry::RetryPolicy;
use crate::engine::alignment::AlignmentRecord;
use crate::engine::chunk::scan_chunk;
use crate::engine::par_granges::intervals::ReferenceCatalog;
use crate::engine::par_granges::{RegionChunk, RegionProcessor};

/// Buffered output is handed to the writer once it grows past this many bytes.
pub const OUTPUT_FLUSH_BYTES: usize = 100_000;

pub struct BreakpointProcessor {
    context: Arc<ScanContext>,
    references: Arc<ReferenceCatalog>,
    read_filter: DefaultReadFilter,
    retry: RetryPolicy,
    flush_bytes: usize,
    /// One reader per sample, reused across chunks.
    reader_pool: Mutex<Vec<Vec<bam::IndexedReader>>>,
}

impl BreakpointProcessor {
    pub fn new(
        context: Arc<ScanContext>,
        references: Arc<ReferenceCatalog>,
        read_filter: DefaultReadFilter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            context,
            references,
            read_filter,
            retry,
            flush_bytes: OUTPUT_FLUSH_BYTES,
            reader_pool: Mutex::new(Vec::new()),
        }
    }

    pub fn with_flush_bytes(mut self, flush_bytes: usize) -> Self {
        self.flush_bytes = flush_bytes;
        self
    }

    fn open_readers(&self) -> Result<Vec<bam::IndexedReader>> {
        self.context
            .samples()
            .iter()
            .map(|sample| open_indexed(&sample.path, &self.retry))
            .collect()
    }
}

fn open_indexed(path: &Path, retry: &RetryPolicy) -> Result<bam::IndexedReader> {
    retry.run(path, || bam::IndexedReader::from_path(path))
}

impl RegionProcessor for BreakpointProcessor {
    /// Newline-terminated output lines, batched.
    type P = String;

    fn process_region(&self, chunk: &RegionChunk, emit: &mut dyn FnMut(Self::P)) -> Result<()> {
        let region = self.references.describe(chunk);
        let chrom = self.references.name(chunk.tid).ok_or_else(|| {
            WhamError::Scoring(format!("chunk {} has no reference sequence", chunk))
        })?;
        debug!("Scanning {}", region);

        let pooled = self.reader_pool.lock().pop();
        let mut readers = match pooled {
            Some(readers) => readers,
            None => self.open_readers()?,
        };
        // A trailing clip breaks at the read's exclusive end, so reads ending
        // exactly on the chunk start still carry evidence for it.
        let fetch_start = chunk.start.saturating_sub(1);
        for reader in readers.iter_mut() {
            reader
                .fetch((chunk.tid, fetch_start, chunk.end))
                .map_err(|e| WhamError::chunk(region.as_str(), e))?;
        }

        let streams: Vec<_> = readers
            .iter_mut()
            .enumerate()
            .map(|(sample, reader)| {
                let region = region.as_str();
                reader.records().map(move |record| {
                    record
                        .map(|rec| AlignmentRecord::from_bam(&rec, sample))
                        .map_err(|e| WhamError::chunk(region, e))
                })
            })
            .collect();

        let mut buffer = String::new();
        let summary = scan_chunk(streams, chunk, &self.read_filter, |window| {
            if let Some(site) = score_site(&self.context, chrom, window)? {
                site.write_line(&mut buffer);
                if buffer.len() > self.flush_bytes {
                    emit(std::mem::take(&mut buffer));
                }
            }
            Ok(())
        })?;
        if !buffer.is_empty() {
            emit(buffer);
        }

        debug!(
            "Finished {}: {} reads admitted, {} filtered, {} sites triggered",
            region, summary.reads_admitted, summary.reads_filtered, summary.sites_triggered
        );
        self.reader_pool.lock().push(readers);
        Ok(())
    }
}
