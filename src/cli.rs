use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Tree to search, as .json or .toml
    pub tree: PathBuf,

    /// Query to run once; omit with --interactive
    pub query: Option<String>,

    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    /// Restrict matching and highlighting to these column indices
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub columns: Option<Vec<usize>>,

    #[clap(long, value_parser)]
    pub min_length: Option<usize>,

    #[clap(long, value_parser)]
    pub max_length: Option<usize>,

    /// Debounce delay in milliseconds for interactive input
    #[clap(long, value_parser)]
    pub delay: Option<u64>,

    #[clap(long, value_parser, default_value_t = false)]
    pub no_expand: bool,

    #[clap(long, value_parser, default_value_t = false)]
    pub no_relevant_sort: bool,

    /// Read one query per line from stdin
    #[clap(short, long, value_parser, default_value_t = false)]
    pub interactive: bool,

    /// Print Prometheus counters before exiting
    #[clap(long, value_parser, default_value_t = false)]
    pub metrics: bool,

    #[clap(long, value_parser, default_value_t = false)]
    pub verbose: bool,

    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,
}
