use std::path::Path;

use anyhow::Result;
use log::info;
use wham_lib::engine::par_granges::{
    bed_to_chunks, split_chunks, tile_reference, ReferenceCatalog, RegionChunk, RegionSpec,
};

/// Build the chunk list from a single region, a BED file, or the whole genome.
pub fn select_chunks(
    references: &ReferenceCatalog,
    region: Option<&RegionSpec>,
    bed: Option<&Path>,
    merge_regions: bool,
    chunksize: u32,
) -> Result<Vec<RegionChunk>> {
    let chunks = match (region, bed) {
        (Some(region), _) => {
            info!("Restricting scan to {}:{}-{}", region.seqid, region.start, region.end);
            split_chunks(vec![region.to_chunk(references)?], chunksize)
        }
        (None, Some(bed)) => {
            info!("Reading regions from {}", bed.display());
            split_chunks(bed_to_chunks(references, bed, merge_regions)?, chunksize)
        }
        (None, None) => tile_reference(references, chunksize),
    };
    info!("{} chunks queued", chunks.len());
    Ok(chunks)
}

/// True when the output path asks for BGZF compression.
pub fn wants_bgzip(output: Option<&Path>) -> bool {
    output.map_or(false, wham_lib::utils::is_bgzipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn references() -> ReferenceCatalog {
        ReferenceCatalog::from_entries(vec![("chr1", 30_000u32), ("chr2", 5_000)])
    }

    #[test]
    fn region_is_split_by_chunksize() {
        let region: RegionSpec = "chr1:1000-25000".parse().unwrap();
        let chunks = select_chunks(&references(), Some(&region), None, false, 10_000).unwrap();
        assert_eq!(
            chunks,
            vec![
                RegionChunk::new(0, 1000, 11_000),
                RegionChunk::new(0, 11_000, 21_000),
                RegionChunk::new(0, 21_000, 25_000),
            ]
        );
    }

    #[test]
    fn unknown_region_sequence_is_an_error() {
        let region: RegionSpec = "chrZ:1-100".parse().unwrap();
        assert!(select_chunks(&references(), Some(&region), None, false, 10_000).is_err());
    }

    #[test]
    fn bed_regions_are_used_when_given() {
        let dir = tempfile::tempdir().unwrap();
        let bed = dir.path().join("r.bed");
        let mut f = std::fs::File::create(&bed).unwrap();
        writeln!(f, "chr2\t100\t300").unwrap();
        writeln!(f, "chr2\t200\t400").unwrap();
        drop(f);
        let chunks = select_chunks(&references(), None, Some(&bed), true, 10_000).unwrap();
        assert_eq!(chunks, vec![RegionChunk::new(1, 100, 400)]);
    }

    #[test]
    fn whole_genome_is_tiled_by_default() {
        let chunks = select_chunks(&references(), None, None, false, 10_000).unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.start >= 500));
    }

    #[test]
    fn gz_output_is_bgzipped() {
        assert!(wants_bgzip(Some(Path::new("calls.vcf.gz"))));
        assert!(!wants_bgzip(Some(Path::new("calls.vcf"))));
        assert!(!wants_bgzip(None));
    }
}
