use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "GIF:    image 0.25\n",
    "HTTP:   rouille 3.6\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Echo, hit counter and Lissajous GIF server
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Interface to bind (overrides config file, default: localhost)
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (overrides config file, default: 8000)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Enable debug logging to file (default: lissajous.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
