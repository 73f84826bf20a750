//! qualimatch CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use qualimatch_core::model::{Design, Phase, Source};

mod commands;

use commands::GlobalArgs;

#[derive(Parser)]
#[command(
    name = "qualimatch",
    version,
    about = "Match research questions to qualitative designs and data sources"
)]
struct Cli {
    /// Seed that fixes item and option order (default from config)
    #[arg(long, global = true)]
    seed: Option<String>,

    /// Participant code (defaults to the remembered one)
    #[arg(long, global = true)]
    pid: Option<String>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON store file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Item bank TOML (default: built-in bank)
    #[arg(long, global = true)]
    bank: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and an editable copy of the item bank
    Init,

    /// Validate an item bank
    Validate,

    /// Remember, show, or forget the participant code
    Participant {
        #[command(subcommand)]
        action: ParticipantAction,
    },

    /// Pretest and posttest quizzes
    Quiz {
        #[command(subcommand)]
        action: QuizAction,
    },

    /// Practice cards with immediate feedback
    Practice {
        #[command(subcommand)]
        action: PracticeAction,
    },

    /// Write your own research question and check its alignment
    Build {
        #[command(subcommand)]
        action: BuildAction,
    },

    /// Suggest a design for a research question
    Infer {
        /// Research question text
        rq: String,

        /// Optional topic, read together with the question
        #[arg(long)]
        topic: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ParticipantAction {
    /// Remember a participant code and carry over anonymous quiz progress
    Set { code: String },
    /// Print the remembered code
    Show,
    /// Forget the remembered code (progress is kept)
    Clear,
}

#[derive(Subcommand)]
pub enum QuizAction {
    /// Show items in seed order and start the timer
    Show { phase: Phase },
    /// Choose a design and/or data source for one item
    Answer {
        phase: Phase,
        item: String,
        #[arg(long)]
        design: Option<Design>,
        #[arg(long)]
        source: Option<Source>,
    },
    /// Score and save the quiz
    Submit { phase: Phase },
    /// Write the last submission as CSV
    Export {
        phase: Phase,
        /// Output file (default: <output_dir>/<phase>_<pid>_<seed>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Clear progress, timer, and last submission
    Reset { phase: Phase },
}

#[derive(Subcommand)]
pub enum PracticeAction {
    /// Show practice cards
    Show,
    /// Check an answer for one card
    Check {
        card: String,
        #[arg(long)]
        design: Option<Design>,
        #[arg(long)]
        source: Option<Source>,
    },
    /// Write all practice attempts as CSV
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Clear the attempt log
    Reset,
}

#[derive(Subcommand)]
pub enum BuildAction {
    /// Update the draft; omitted fields keep their value
    Edit {
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        rq: Option<String>,
        #[arg(long)]
        design: Option<Design>,
        #[arg(long)]
        source: Option<Source>,
    },
    /// Show the draft
    Show,
    /// Check the draft's alignment
    Check,
    /// Save the draft as your build entry
    Save,
    /// Write the saved build entry as CSV
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Clear the draft and the saved entry
    Reset,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qualimatch=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = GlobalArgs {
        seed: cli.seed,
        pid: cli.pid,
        config: cli.config,
        store: cli.store,
        bank: cli.bank,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate => commands::validate::execute(&global),
        Commands::Participant { action } => commands::participant::execute(&global, action),
        Commands::Quiz { action } => commands::quiz::execute(&global, action),
        Commands::Practice { action } => commands::practice::execute(&global, action),
        Commands::Build { action } => commands::build::execute(&global, action),
        Commands::Infer { rq, topic } => commands::infer::execute(&global, rq, topic),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
