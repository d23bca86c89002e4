use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "avmeta")]
#[command(author, version, about = "Multi-source AV metadata resolver")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve an avid to metadata, caching the result
    Resolve {
        /// Video identifier to resolve
        #[arg(required = true)]
        avid: String,

        /// Query one named source instead of the fallback chain
        #[arg(long)]
        source: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store a session cookie for a source
    SetCookie {
        /// Source name
        source: String,

        /// Serialized cookie string ("k1=v1; k2=v2")
        cookie: String,
    },

    /// Acquire a fresh session cookie from a source's home page
    Bootstrap {
        /// Source name
        source: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
