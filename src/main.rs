use clap::Parser;
use tracing_subscriber::EnvFilter;

use resume_ranker::cli::{self, handlers};
use resume_ranker::config::Config;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = cli::Args::parse();
    let config = Config::load()?;

    match args.command {
        cli::Command::Rank {
            resumes,
            job_args,
            weight_args,
            csv,
            json,
        } => handlers::handle_rank(resumes, job_args, weight_args, csv, json, &config),

        cli::Command::Score {
            resume,
            job_args,
            weight_args,
        } => handlers::handle_score(resume, job_args, weight_args, &config),

        cli::Command::Gaps {
            resume,
            job_args,
            json,
        } => handlers::handle_gaps(resume, job_args, json, &config),

        cli::Command::Suggest {
            resume,
            target_role,
        } => handlers::handle_suggest(resume, target_role, &config),

        cli::Command::Compare {
            resume,
            weight_args,
            json,
        } => handlers::handle_compare(resume, weight_args, json, &config),

        cli::Command::Roles { action } => handlers::handle_roles(action, &config),
    }
}
