use crate::core::error::Result;
use grep_cli::stdout;
use gzp::{deflate::Bgzf, Compression, ZBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use termcolor::ColorChoice;

/// Open a byte sink targeting a file or stdout with optional BGZF compression.
///
/// `None` and `-` both resolve to stdout.
pub fn get_output<P: AsRef<Path>>(
    path: &Option<P>,
    bgzipped: bool,
    threads: usize,
    compression_level: u32,
) -> Result<Box<dyn Write>> {
    let raw_writer: Box<dyn Write> = match path {
        Some(path) if path.as_ref().to_str() != Some("-") => {
            let writer = BufWriter::new(File::create(path)?);
            if bgzipped {
                Box::new(
                    ZBuilder::<Bgzf, _>::new()
                        .num_threads(threads)
                        .compression_level(Compression::new(compression_level))
                        .from_writer(writer),
                )
            } else {
                Box::new(writer)
            }
        }
        _ => {
            let writer = stdout(ColorChoice::Never);
            if bgzipped {
                Box::new(
                    ZBuilder::<Bgzf, _>::new()
                        .num_threads(threads)
                        .compression_level(Compression::new(compression_level))
                        .from_writer(writer),
                )
            } else {
                Box::new(writer)
            }
        }
    };
    Ok(raw_writer)
}

/// Build a tab-delimited CSV writer on top of [`get_output`].
pub fn get_writer<P: AsRef<Path>>(
    path: &Option<P>,
    bgzipped: bool,
    write_headers: bool,
    threads: usize,
    compression_level: u32,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let raw_writer = get_output(path, bgzipped, threads, compression_level)?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(write_headers)
        .from_writer(raw_writer))
}
