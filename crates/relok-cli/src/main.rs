//! Relok CLI - redirect Helm chart images through a private registry

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::inspect::OutputFormat;

#[derive(Parser)]
#[command(name = "relok")]
#[command(author = "Relok Contributors")]
#[command(version)]
#[command(about = "Redirect Helm chart image references through a private registry", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report image patterns found in a chart (read-only)
    Inspect {
        /// Chart directory
        chart: PathBuf,

        /// Source registries, used to annotate each pattern's scope
        #[arg(short = 'r', long = "source-registries", value_delimiter = ',')]
        source_registries: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Generate a values overlay redirecting in-scope images
    Override {
        /// Chart directory
        chart: PathBuf,

        /// Registry images are redirected to
        #[arg(short = 't', long)]
        target_registry: String,

        /// Registries whose images are in scope for redirection
        #[arg(short = 'r', long = "source-registries", value_delimiter = ',', required = true)]
        source_registries: Vec<String>,

        /// Registries excluded from redirection (wins over sources)
        #[arg(long = "exclude-registries", value_delimiter = ',')]
        exclude_registries: Vec<String>,

        /// Registry mappings file (structured or legacy flat YAML)
        #[arg(long)]
        registry_file: Option<PathBuf>,

        /// Path strategy for destination repositories
        #[arg(long, default_value = "prefix-source-registry")]
        strategy: String,

        /// Fail when unsupported image structures are found
        #[arg(long)]
        strict: bool,

        /// Minimum match rate percentage required to succeed
        #[arg(long, default_value_t = 100)]
        threshold: u32,

        /// Write the overlay to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.debug {
        // SAFETY: We're the only thread at this point (start of main)
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    let result = match cli.command {
        Commands::Inspect {
            chart,
            source_registries,
            output_format,
        } => commands::inspect::run(&chart, &source_registries, output_format),

        Commands::Override {
            chart,
            target_registry,
            source_registries,
            exclude_registries,
            registry_file,
            strategy,
            strict,
            threshold,
            output,
        } => commands::overrides::run(
            &chart,
            &target_registry,
            &source_registries,
            &exclude_registries,
            registry_file.as_deref(),
            &strategy,
            strict,
            threshold,
            output.as_deref(),
        ),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
