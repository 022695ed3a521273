use std::path::PathBuf;

use structopt::StructOpt;

/// CLI arguments for the `profile` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "profile")]
pub struct ProfileArgs {
    /// Target alignment files (comma separated or repeated).
    #[structopt(long, short = "t", required = true, use_delimiter = true, parse(from_os_str))]
    pub target: Vec<PathBuf>,

    /// Background alignment files (comma separated or repeated).
    #[structopt(long, short = "b", use_delimiter = true, parse(from_os_str))]
    pub background: Vec<PathBuf>,

    /// Output TSV (default: stdout). A `.gz` suffix writes BGZF.
    #[structopt(long, short = "o", parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// Threads used for output compression.
    #[structopt(long, short = "x", default_value = "1")]
    pub threads: usize,
}

#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub target: Vec<PathBuf>,
    pub background: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub threads: usize,
}

impl From<ProfileArgs> for ProfileConfig {
    fn from(args: ProfileArgs) -> ProfileConfig {
        ProfileConfig {
            target: args.target,
            background: args.background,
            output: args.output,
            threads: args.threads,
        }
    }
}
