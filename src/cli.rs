use bex_lib::Viewport;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bex")]
#[command(
    version,
    about = "Brand Extraction Engine - extract brand palettes and synthesize UI themes",
    long_about = "Brand Extraction Engine (BEX)\n\nModes:\n- website: render a URL in a sandboxed headless browser and extract its brand palette.\n- image: extract a palette from a local image, an image URL, or base64 data.\n\nBoth print an extraction result (palette + suggested theme) as JSON.\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for viewport/timeouts/extraction knobs; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a brand palette and theme from a rendered website
    Website {
        #[arg(help = "Target URL (http or https)")]
        url: String,

        #[arg(long, help = "Viewport dimensions (WIDTHxHEIGHT)")]
        viewport: Option<Viewport>,

        #[arg(long, help = "Navigation timeout (seconds)")]
        nav_timeout: Option<u64>,

        #[arg(long, help = "Network idle timeout (seconds)")]
        network_idle_timeout: Option<u64>,

        #[arg(long, help = "Process timeout (seconds) for the render helper")]
        process_timeout: Option<u64>,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Extract a brand palette and theme from an image
    Image {
        #[arg(help = "Image file path, image URL, or base64 data (with --base64)")]
        input: String,

        #[arg(long, help = "Treat the input as base64-encoded image data")]
        base64: bool,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
