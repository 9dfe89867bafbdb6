use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

mod errors;
pub mod handlers;
mod validation;

#[derive(Parser, Debug)]
#[command(version, about = "Score and rank resumes against a job description", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the job description and keyword lists come from.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct JobArgs {
    /// Role profile name (file stem in the profiles directory)
    #[clap(short, long)]
    pub role: Option<String>,

    /// Job description file (text or PDF)
    #[clap(short, long, conflicts_with = "role")]
    pub job: Option<PathBuf>,

    /// Comma-separated must-have keywords (replaces the profile's list)
    #[clap(long, allow_hyphen_values = true)]
    pub must: Option<String>,

    /// Comma-separated nice-to-have keywords (replaces the profile's list)
    #[clap(long, allow_hyphen_values = true)]
    pub nice: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct WeightArgs {
    /// Must-have keyword weight (config default otherwise)
    #[clap(long)]
    pub w_must: Option<f32>,

    /// Nice-to-have keyword weight
    #[clap(long)]
    pub w_nice: Option<f32>,

    /// Semantic (embeddings + TF-IDF) weight
    #[clap(long)]
    pub w_emb: Option<f32>,

    /// Skip the embedding model and score with keywords and TF-IDF only
    #[clap(long, default_value = "false")]
    pub lexical_only: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RolesArgs {
    /// List role profiles
    List {},
    /// Create or replace a role profile
    Add {
        /// Role name, used as the file name
        name: String,

        /// Role description
        #[clap(short, long, default_value = "")]
        description: String,

        /// Comma-separated must-have keywords
        #[clap(long, default_value = "")]
        must: String,

        /// Comma-separated nice-to-have keywords
        #[clap(long, default_value = "")]
        nice: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score many resumes and print them ranked by total score
    Rank {
        /// Resume files (PDF or text)
        #[clap(required = true)]
        resumes: Vec<PathBuf>,

        #[clap(flatten)]
        job_args: JobArgs,

        #[clap(flatten)]
        weight_args: WeightArgs,

        /// Also write the ranking as CSV
        #[clap(long)]
        csv: Option<PathBuf>,

        /// Print JSON instead of a table
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// Print the full score breakdown of one resume as JSON
    Score {
        resume: PathBuf,

        #[clap(flatten)]
        job_args: JobArgs,

        #[clap(flatten)]
        weight_args: WeightArgs,
    },
    /// Show missing keywords and tips for one resume
    Gaps {
        resume: PathBuf,

        #[clap(flatten)]
        job_args: JobArgs,

        /// Print JSON
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// Suggest skills for a target role from the built-in role table
    Suggest {
        resume: PathBuf,

        /// e.g. "Data Scientist", "ML Engineer", "Data Analyst"
        #[clap(short, long)]
        target_role: String,
    },
    /// Score one resume against every role profile and report the best fit
    Compare {
        resume: PathBuf,

        #[clap(flatten)]
        weight_args: WeightArgs,

        /// Print JSON instead of a table
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// Manage role profiles
    Roles {
        #[clap(subcommand)]
        action: Option<RolesArgs>,
    },
}
