use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use timed_quiz::{
    ConfigError, JsonFileSource, QuestionSource, Quiz, QuizError, SessionConfig,
    UnavailableSource,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Timed multiple-choice quiz in the terminal", long_about = None)]
struct Args {
    /// JSON file to load the questions from
    #[arg(short, long)]
    questions: Option<PathBuf>,

    /// TOML file with session settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session length in seconds (overrides the config file)
    #[arg(short, long)]
    duration: Option<u32>,

    /// Low-time warning threshold in seconds (overrides the config file)
    #[arg(short, long)]
    warning: Option<u32>,

    /// Write the review as JSON here after submitting
    #[arg(long)]
    export_review: Option<PathBuf>,

    /// Write logs to this file (set RUST_LOG to adjust verbosity)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> std::io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("timed_quiz=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn session_config(args: &Args) -> Result<SessionConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_toml_file(path)?,
        None => SessionConfig::default(),
    };

    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }
    if let Some(warning) = args.warning {
        config.warning_threshold_secs = warning;
    }

    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<(), QuizError> {
    let config = session_config(&args)?;

    let source: Box<dyn QuestionSource> = match &args.questions {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(UnavailableSource::new("no question file given")),
    };

    let mut quiz = Quiz::from_source(source.as_ref(), config).await;
    if let Some(path) = args.export_review {
        quiz = quiz.with_review_export(path);
    }

    quiz.run()
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.log_file.as_ref()) {
        eprintln!("Could not open log file: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}
