//! Per-chunk scan loop.
//!
//! Drives one [`PileupWindow`] across a chunk: admit every read whose start has
//! been reached, purge expired reads, hand the window to a site callback when a
//! clipped end lands on the scan coordinate, then advance. Each sample's reads
//! come from their own coordinate-sorted stream, consumed strictly in order.

use std::iter::Peekable;

use log::trace;

use crate::core::error::Result;
use crate::core::read_filter::ReadFilter;
use crate::engine::alignment::AlignmentRecord;
use crate::engine::par_granges::RegionChunk;
use crate::engine::pileup::PileupWindow;

/// Counters reported once a chunk finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSummary {
    pub reads_admitted: u64,
    pub reads_filtered: u64,
    pub sites_triggered: u64,
}

struct RecordStream<I: Iterator<Item = Result<AlignmentRecord>>> {
    inner: Peekable<I>,
}

impl<I: Iterator<Item = Result<AlignmentRecord>>> RecordStream<I> {
    /// Start of the next record, surfacing reader errors.
    fn peek_start(&mut self) -> Result<Option<i64>> {
        match self.inner.peek() {
            None => Ok(None),
            Some(Ok(record)) => Ok(Some(record.start)),
            Some(Err(_)) => match self.inner.next() {
                Some(Err(err)) => Err(err),
                _ => unreachable!("peeked an error"),
            },
        }
    }
}

/// Scan `chunk`, calling `on_site` for every triggered coordinate inside it.
///
/// Reads overlapping the chunk but starting before it are admitted on the first
/// step; coordinates outside `[chunk.start, chunk.end)` are never scored.
pub fn scan_chunk<I, F, S>(
    streams: Vec<I>,
    chunk: &RegionChunk,
    read_filter: &F,
    mut on_site: S,
) -> Result<ChunkSummary>
where
    I: Iterator<Item = Result<AlignmentRecord>>,
    F: ReadFilter,
    S: FnMut(&PileupWindow) -> Result<()>,
{
    let mut streams: Vec<RecordStream<I>> = streams
        .into_iter()
        .map(|inner| RecordStream {
            inner: inner.peekable(),
        })
        .collect();

    let chunk_start = chunk.start as i64;
    let chunk_end = chunk.end as i64;
    let mut window = PileupWindow::new(chunk_start);
    let mut summary = ChunkSummary::default();

    loop {
        let position = window.position();
        for stream in streams.iter_mut() {
            while let Some(start) = stream.peek_start()? {
                if start > position {
                    break;
                }
                if let Some(Ok(record)) = stream.inner.next() {
                    if read_filter.filter_read(&record) {
                        window.admit(record);
                    } else {
                        summary.reads_filtered += 1;
                    }
                }
            }
        }

        window.purge_past();

        if window.is_empty() {
            let mut next_start: Option<i64> = None;
            for stream in streams.iter_mut() {
                if let Some(start) = stream.peek_start()? {
                    next_start = Some(next_start.map_or(start, |s| s.min(start)));
                }
            }
            match next_start {
                Some(start) if start < chunk_end => {
                    if start > position {
                        window.jump_to(start);
                    } else {
                        window.advance();
                    }
                    continue;
                }
                _ => break,
            }
        }

        if position >= chunk_end {
            break;
        }

        if window.triggers_score() {
            trace!("Clipped breakpoint live at {}:{}", chunk.tid, position);
            summary.sites_triggered += 1;
            on_site(&window)?;
        }

        window.advance();
    }

    summary.reads_admitted = window.admitted();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::WhamError;
    use crate::core::read_filter::DefaultReadFilter;

    fn stream(reads: Vec<AlignmentRecord>) -> std::vec::IntoIter<Result<AlignmentRecord>> {
        reads.into_iter().map(Ok).collect::<Vec<_>>().into_iter()
    }

    fn chunk(start: u32, end: u32) -> RegionChunk {
        RegionChunk {
            tid: 0,
            start,
            end,
        }
    }

    #[test]
    fn scores_clip_positions_across_samples() {
        let a = vec![
            AlignmentRecord::builder(0, "a1", 900, 1000)
                .trailing_clip(30)
                .build(),
            AlignmentRecord::builder(0, "a2", 950, 1000)
                .trailing_clip(10)
                .build(),
        ];
        let b = vec![AlignmentRecord::builder(1, "b1", 1000, 1100)
            .leading_clip(25)
            .build()];
        let mut sites = Vec::new();
        let summary = scan_chunk(
            vec![stream(a), stream(b)],
            &chunk(0, 5000),
            &DefaultReadFilter::default(),
            |window| {
                sites.push((window.position(), window.live_reads().count()));
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(sites, vec![(1000, 3)]);
        assert_eq!(summary.reads_admitted, 3);
        assert_eq!(summary.sites_triggered, 1);
    }

    #[test]
    fn empty_chunk_completes_without_sites() {
        let mut calls = 0;
        let summary = scan_chunk(
            vec![stream(vec![]), stream(vec![])],
            &chunk(0, 1000),
            &DefaultReadFilter::default(),
            |_| {
                calls += 1;
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(summary, ChunkSummary::default());
    }

    #[test]
    fn ignores_sites_outside_chunk() {
        let reads = vec![
            AlignmentRecord::builder(0, "early", 100, 200)
                .trailing_clip(5)
                .build(),
            AlignmentRecord::builder(0, "inside", 400, 500)
                .trailing_clip(5)
                .build(),
            AlignmentRecord::builder(0, "late", 700, 1200)
                .leading_clip(5)
                .build(),
        ];
        let mut positions = Vec::new();
        scan_chunk(
            vec![stream(reads)],
            &chunk(250, 600),
            &DefaultReadFilter::default(),
            |window| {
                positions.push(window.position());
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(positions, vec![500]);
    }

    #[test]
    fn reads_ending_on_the_chunk_start_are_scored() {
        let reads = vec![
            AlignmentRecord::builder(0, "a", 400, 500)
                .trailing_clip(5)
                .build(),
            AlignmentRecord::builder(0, "b", 420, 500)
                .trailing_clip(5)
                .build(),
        ];
        let mut sites = Vec::new();
        scan_chunk(
            vec![stream(reads)],
            &chunk(500, 600),
            &DefaultReadFilter::default(),
            |window| {
                sites.push((window.position(), window.live_reads().count()));
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(sites, vec![(500, 2)]);
    }

    #[test]
    fn filtered_reads_never_enter_window() {
        let reads = vec![
            AlignmentRecord::builder(0, "mq0", 100, 200)
                .trailing_clip(5)
                .mapq(0)
                .build(),
            AlignmentRecord::builder(0, "ok", 150, 250).build(),
        ];
        let mut calls = 0;
        let summary = scan_chunk(
            vec![stream(reads)],
            &chunk(0, 1000),
            &DefaultReadFilter::default(),
            |_| {
                calls += 1;
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(summary.reads_filtered, 1);
        assert_eq!(summary.reads_admitted, 1);
    }

    #[test]
    fn reader_errors_surface() {
        let items: Vec<Result<AlignmentRecord>> = vec![
            Ok(AlignmentRecord::builder(0, "a", 10, 50).build()),
            Err(WhamError::chunk("chr1:0-100", "truncated BGZF block")),
        ];
        let err = scan_chunk(
            vec![items.into_iter()],
            &chunk(0, 100),
            &DefaultReadFilter::default(),
            |_| Ok(()),
        )
        .unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn callback_errors_abort_scan() {
        let reads = vec![AlignmentRecord::builder(0, "a", 10, 50)
            .leading_clip(5)
            .build()];
        let err = scan_chunk(
            vec![stream(reads)],
            &chunk(0, 100),
            &DefaultReadFilter::default(),
            |_| Err(WhamError::Scoring("bad sample".into())),
        )
        .unwrap_err();
        assert!(err.is_fatal());
    }
}
