use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// modlib - inspect native module libraries and resolve classes
#[derive(Debug, Parser)]
#[command(name = "modlib", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration body format: simple or indexed.
    #[arg(long, global = true, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Version policy: newest or last-match.
    #[arg(long, global = true, value_name = "POLICY")]
    pub policy: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display the library chain: roots, flags, parents and module counts.
    Info {
        /// Path to the module library.
        #[arg(value_name = "LIBRARY")]
        library: PathBuf,
    },

    /// Resolve a module query to its declaring directory and configuration file.
    Resolve {
        /// Path to the module library.
        #[arg(value_name = "LIBRARY")]
        library: PathBuf,

        /// Module query (e.g. app, app@1.0, app@>=1.0). Defaults to classpath mode.
        #[arg(value_name = "QUERY")]
        query: Option<String>,
    },

    /// Load a configuration and list its contexts and modules.
    Contexts {
        /// Path to the module library.
        #[arg(value_name = "LIBRARY")]
        library: PathBuf,

        /// Module query. Defaults to classpath mode.
        #[arg(value_name = "QUERY")]
        query: Option<String>,

        /// Modules whose contexts are excluded from bootstrap loading.
        #[arg(long, value_name = "MODULE", value_delimiter = ',')]
        exclude: Vec<String>,
    },

    /// Find the module supplying a class.
    Find {
        /// Path to the module library.
        #[arg(value_name = "LIBRARY")]
        library: PathBuf,

        /// Class name in internal form (e.g. java/lang/Object).
        #[arg(value_name = "CLASS")]
        class: String,

        /// Module query. Defaults to classpath mode.
        #[arg(long, value_name = "QUERY")]
        query: Option<String>,

        /// Context to start the search in. Defaults to the base context.
        #[arg(long, value_name = "NAME")]
        context: Option<String>,
    },

    /// Extract a class file.
    Extract {
        /// Path to the module library.
        #[arg(value_name = "LIBRARY")]
        library: PathBuf,

        /// Class name in internal form (e.g. java/lang/Object).
        #[arg(value_name = "CLASS")]
        class: String,

        /// Module query. Defaults to classpath mode.
        #[arg(long, value_name = "QUERY")]
        query: Option<String>,

        /// Output file.
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}
