use anyhow::Result;
use multitype_codegen::cli::{Cli, Commands, GenerateArgs};
use multitype_codegen::config::Config;
use multitype_codegen::pipeline::{Job, Pipeline};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Generate(args) => {
            init_tracing(args.verbose);
            run_generate(&args)?;
        }
        Commands::Init { output, force } => {
            init_tracing(false);
            run_init(&output, force)?;
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` when it is set
fn init_tracing(verbose: bool) {
    let default = if verbose { "multitype_codegen=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the generate command
fn run_generate(args: &GenerateArgs) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;
    tracing::debug!(config = %args.config.display(), "loaded configuration");

    let job = Job::from_args(args)?;
    let outcome = Pipeline::new(config).run(&job)?;

    if job.dry_run {
        print!("{}", outcome.output);
        return Ok(());
    }

    for name in &outcome.report.inserted {
        println!("Generated {} in {}", name, outcome.target);
    }
    for name in &outcome.report.skipped {
        println!("Skipped {}: already declared in {}", name, outcome.target);
    }
    if outcome.written {
        println!("Updated {}", outcome.path.display());
    }

    Ok(())
}

/// Run the init command
fn run_init(output_path: &std::path::Path, force: bool) -> Result<()> {
    if output_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    let config = Config::default_config();
    config.save(output_path)?;

    println!("Created configuration file: {}", output_path.display());
    println!("\nEdit the file to configure:");
    println!("  - source_dir: Where --class looks for Java files (default app/src/main/java)");
    println!("  - on_duplicate: \"reject\" or \"skip\" members that already exist");
    println!("  - flavor: \"androidx\" or \"support\" imports for generated code");
    println!("  - format: Indentation used when re-formatting the host class");

    Ok(())
}
