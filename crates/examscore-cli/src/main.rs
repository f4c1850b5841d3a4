//! examscore CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use examscore_core::similarity::SimilarityPolicy;

mod commands;

#[derive(Parser)]
#[command(
    name = "examscore",
    version,
    about = "Automatic scoring of free-text exam answers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP scoring service
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Score a request file through the remote/local cascade
    Score {
        /// JSON file shaped like a scoring request: {"answers": [...]}
        #[arg(long)]
        answers: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Print the similarity of two texts
    Similarity {
        /// Reference (key) answer
        reference: String,

        /// Candidate (student) answer
        candidate: String,

        /// Similarity policy: standard, lenient
        #[arg(long, default_value = "standard")]
        policy: SimilarityPolicy,
    },

    /// Create a starter config and an example request file
    Init,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("examscore=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config, host, port } => {
            commands::serve::execute(config, host, port).await
        }
        Commands::Score {
            answers,
            config,
            format,
        } => commands::score::execute(answers, config, format).await,
        Commands::Similarity {
            reference,
            candidate,
            policy,
        } => commands::similarity::execute(&reference, &candidate, policy),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
