use clap::Parser;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "bucketfinder",
    version,
    long_version = LONG_VERSION,
    about = "Find open and protected S3 buckets from keyword mutations",
    long_about = "BucketFinder expands keywords with wordlist, prefix and suffix mutations into candidate bucket names\nand probes each one over HTTP (or DNS with --dns) to classify it as open, protected or missing."
)]
pub struct Args {
    /// Keywords to mutate; read one per line from stdin when omitted
    #[arg(value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Wordlist combined with every keyword
    #[arg(short = 'w', long = "wordlist", value_name = "FILE")]
    pub wordlist: Option<PathBuf>,

    /// Prefix list
    #[arg(short = 'p', long = "prefixes", value_name = "FILE")]
    pub prefixes: Option<PathBuf>,

    /// Suffix list
    #[arg(short = 's', long = "suffixes", value_name = "FILE")]
    pub suffixes: Option<PathBuf>,

    /// Number of concurrent workers (1 probes sequentially)
    #[arg(short = 'c', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Delay before each request, in milliseconds
    #[arg(short = 'd', long = "delay", value_name = "MS")]
    pub delay: Option<u64>,

    /// Directory for result logs and the progress file
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Continue from the saved progress file
    #[arg(long = "resume")]
    pub resume: bool,

    /// Start at this candidate index, ignoring saved progress
    #[arg(long = "skip", value_name = "INDEX")]
    pub skip: Option<usize>,

    /// Classify by CNAME lookup only, without HTTP requests
    #[arg(long = "dns")]
    pub dns_only: bool,

    /// List object keys of open buckets
    #[arg(short = 'e', long = "enumerate")]
    pub enumerate: bool,

    /// Storage endpoint (host for virtual-host style, URL for path style)
    #[arg(long = "endpoint", value_name = "HOST|URL")]
    pub endpoint: Option<String>,

    /// Put the bucket name in the URL path instead of the host name
    #[arg(long = "path-style")]
    pub path_style: bool,

    /// Print the candidate names and exit without probing
    #[arg(long = "list")]
    pub list: bool,

    /// Configuration file path
    #[arg(long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Silent mode (only output hits)
    #[arg(long = "silent")]
    pub silent: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Disable colored status lines
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl Args {
    /// Check if keywords should come from stdin
    pub fn use_stdin(&self) -> bool {
        self.keywords.is_empty() && !atty::is(atty::Stream::Stdin)
    }
}
