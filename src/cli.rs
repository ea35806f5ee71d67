use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate MultiType item view binders into Android Java classes
#[derive(Parser, Debug)]
#[command(name = "multitype-codegen")]
#[command(version)]
#[command(about = "Generate MultiType ItemViewBinder classes into Android Java sources")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a data holder and its view binder into a class
    Generate(GenerateArgs),

    /// Write a default configuration file
    Init {
        /// Where to write the configuration
        #[arg(short, long, default_value = "multitype.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Data type name, UpperCamel (e.g. `UserProfile`)
    pub type_name: String,

    /// Java file to generate into
    #[arg(short, long, conflicts_with = "class")]
    pub file: Option<PathBuf>,

    /// Find the file by the name of a class it declares, under `input.source_dir`
    #[arg(long)]
    pub class: Option<String>,

    /// Nested class to generate into, e.g. `FeedActivity.Adapter`
    #[arg(short, long, conflicts_with = "line")]
    pub target: Option<String>,

    /// Generate into the innermost class around this 1-based line
    #[arg(short, long)]
    pub line: Option<usize>,

    /// Generate only the view binder, not the data holder
    #[arg(long)]
    pub only_binder: bool,

    /// Print the result instead of writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the configuration file
    #[arg(short, long, default_value = "multitype.toml")]
    pub config: PathBuf,

    /// Log every generation step
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
