use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{
    advice::{gaps, AdviceTables, GapResult, Suggestions},
    cli::{
        errors::CliError,
        validation::{parse_keywords, validate_file, validate_weight},
        JobArgs, RolesArgs, WeightArgs,
    },
    config::Config,
    parser::{self, ParsedResume},
    profiles::{ProfileKeywords, ProfileStore, RoleProfile},
    ranking::{self, Candidate, RankedCandidate},
    report,
    scoring::{DisabledBackend, EmbeddingService, LexicalScorer, ScoreComposer, WeightSet},
};

/// Job text plus the keyword lists it is judged on.
#[derive(Debug, Clone, Default)]
pub struct JobTarget {
    pub text: String,
    pub must_have: Vec<String>,
    pub nice_to_have: Vec<String>,
}

impl JobTarget {
    /// Resolve `--role` / `--job` / `--must` / `--nice`.
    ///
    /// Explicit keyword lists replace the profile's lists. With `require_text`
    /// unset a bare keyword list is enough (gap analysis never reads the text).
    pub fn resolve(args: &JobArgs, profiles: &ProfileStore, require_text: bool) -> Result<Self> {
        let mut target = match (&args.role, &args.job) {
            (Some(role), _) => {
                let profile = profiles
                    .load(role)
                    .with_context(|| format!("loading role profile from {}", profiles.dir().display()))?;
                Self {
                    text: profile.job_text(),
                    must_have: profile.keywords.must_have,
                    nice_to_have: profile.keywords.nice_to_have,
                }
            }
            (None, Some(path)) => {
                validate_file(path)?;
                let parsed = parser::parse_file(path)?;
                Self {
                    text: parsed.raw_text,
                    ..Default::default()
                }
            }
            (None, None) if require_text => {
                return Err(CliError::invalid_input("either --role or --job is required").into());
            }
            (None, None) => Self::default(),
        };

        if let Some(must) = &args.must {
            target.must_have = parse_keywords(must);
        }
        if let Some(nice) = &args.nice {
            target.nice_to_have = parse_keywords(nice);
        }

        if !require_text && args.role.is_none() && target.must_have.is_empty() && target.nice_to_have.is_empty() {
            return Err(CliError::invalid_input("pass --role or at least one of --must / --nice").into());
        }

        Ok(target)
    }
}

fn weights(config: &Config, args: &WeightArgs) -> Result<WeightSet> {
    validate_weight("w_must", args.w_must)?;
    validate_weight("w_nice", args.w_nice)?;
    validate_weight("w_emb", args.w_emb)?;
    Ok(config.weights.with_overrides(args.w_must, args.w_nice, args.w_emb))
}

/// Composer wired to the configured backend.
///
/// `--lexical-only` or `embeddings.enabled: false` installs the disabled
/// backend with lexical fallback on, so the model is never loaded.
pub fn build_composer(config: &Config, lexical_only: bool) -> ScoreComposer {
    let lexical = LexicalScorer::new(config.lexical.max_features);

    if lexical_only || !config.embeddings.enabled {
        log::info!("Embeddings disabled, scoring with keywords and TF-IDF only");
        return ScoreComposer::new(Arc::new(DisabledBackend))
            .with_lexical(lexical)
            .with_lexical_fallback(true);
    }

    let service = EmbeddingService::new(config.embeddings.clone(), config.base_path().to_path_buf());
    ScoreComposer::new(Arc::new(service))
        .with_lexical(lexical)
        .with_lexical_fallback(config.embeddings.lexical_fallback)
}

/// Built-in tables unless the config points at an override file.
pub fn advice_tables(config: &Config) -> Result<AdviceTables> {
    match config.advice_path() {
        Some(path) => Ok(AdviceTables::load(&path)?),
        None => Ok(AdviceTables::builtin().clone()),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse every resume, skipping unreadable ones with a warning.
fn read_resumes(paths: &[PathBuf]) -> Result<Vec<(String, ParsedResume)>> {
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")?.progress_chars("=> "),
    );

    let mut parsed = Vec::with_capacity(paths.len());
    for path in paths {
        let name = display_name(path);
        pb.set_message(name.clone());
        match parser::parse_file(path) {
            Ok(resume) => parsed.push((name, resume)),
            Err(e) => {
                pb.suspend(|| log::warn!("Skipping {}: {}", path.display(), e));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if parsed.is_empty() {
        return Err(CliError::invalid_input("none of the resumes could be read").into());
    }
    Ok(parsed)
}

/// Read, score, gap and rank every readable resume against one job.
pub fn rank_resumes(
    paths: &[PathBuf],
    job: &JobTarget,
    weights: &WeightSet,
    composer: &ScoreComposer,
) -> Result<Vec<RankedCandidate>> {
    let parsed = read_resumes(paths)?;
    let texts: Vec<&str> = parsed.iter().map(|(_, r)| r.raw_text.as_str()).collect();
    let scores = composer.score_batch(&job.text, &texts, weights, &job.must_have, &job.nice_to_have)?;

    let candidates = parsed
        .iter()
        .zip(scores)
        .map(|((name, resume), score)| Candidate {
            name: name.clone(),
            score,
            gaps: gaps(&resume.raw_text, &job.must_have, &job.nice_to_have),
        })
        .collect();
    Ok(ranking::rank(candidates))
}

pub fn handle_rank(
    resumes: Vec<PathBuf>,
    job_args: JobArgs,
    weight_args: WeightArgs,
    csv: Option<PathBuf>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let _span = tracing::info_span!("rank", resumes = resumes.len()).entered();

    let weights = weights(config, &weight_args)?;
    let profiles = ProfileStore::open(config.profiles_path())?;
    let job = JobTarget::resolve(&job_args, &profiles, true)?;

    let composer = build_composer(config, weight_args.lexical_only);
    let ranked = rank_resumes(&resumes, &job, &weights, &composer)?;

    if let Some(path) = csv {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        report::write_csv(BufWriter::new(file), &ranked)?;
        log::info!("Wrote {} rows to {}", ranked.len(), path.display());
    }

    if json {
        println!("{}", report::to_json(&ranked)?);
    } else {
        print!("{}", report::render_table(&ranked, "resume"));
    }

    Ok(())
}

/// `data_scientist` -> `Data Scientist`.
pub fn role_title(role: &str) -> String {
    role.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Score one resume against every role profile, best fit first.
///
/// Each role uses its own `job_text()` and keyword lists. The resume text is
/// identical across calls, so a memoizing backend embeds it once.
pub fn compare_roles(
    composer: &ScoreComposer,
    resume_text: &str,
    roles: &[(String, RoleProfile)],
    weights: &WeightSet,
) -> Result<Vec<RankedCandidate>> {
    let mut candidates = Vec::with_capacity(roles.len());
    for (role, profile) in roles {
        let must = &profile.keywords.must_have;
        let nice = &profile.keywords.nice_to_have;
        let score = composer.score(resume_text, &profile.job_text(), weights, must, nice)?;
        candidates.push(Candidate {
            name: role_title(role),
            score,
            gaps: gaps(resume_text, must, nice),
        });
    }
    Ok(ranking::rank(candidates))
}

pub fn handle_compare(resume: PathBuf, weight_args: WeightArgs, json: bool, config: &Config) -> Result<()> {
    let _span = tracing::info_span!("compare").entered();

    validate_file(&resume)?;
    let weights = weights(config, &weight_args)?;
    let profiles = ProfileStore::open(config.profiles_path())?;

    let mut roles = Vec::new();
    for role in profiles.list_roles() {
        match profiles.load(&role) {
            Ok(profile) => roles.push((role, profile)),
            Err(e) => log::warn!("Skipping role {role}: {e}"),
        }
    }
    if roles.is_empty() {
        return Err(CliError::invalid_input(format!(
            "no role profiles in {}",
            profiles.dir().display()
        ))
        .into());
    }

    let parsed = parser::parse_file(&resume)?;
    let composer = build_composer(config, weight_args.lexical_only);
    let ranked = compare_roles(&composer, &parsed.raw_text, &roles, &weights)?;

    if json {
        println!("{}", report::to_json(&ranked)?);
        return Ok(());
    }

    print!("{}", report::render_table(&ranked, "role"));
    if let Some(best) = ranked.first() {
        println!();
        println!("Best fit: {} ({:.2})", best.name, best.score.total_score);
    }
    Ok(())
}

pub fn handle_score(resume: PathBuf, job_args: JobArgs, weight_args: WeightArgs, config: &Config) -> Result<()> {
    let _span = tracing::info_span!("score").entered();

    validate_file(&resume)?;
    let weights = weights(config, &weight_args)?;
    let profiles = ProfileStore::open(config.profiles_path())?;
    let job = JobTarget::resolve(&job_args, &profiles, true)?;

    let parsed = parser::parse_file(&resume)?;
    let composer = build_composer(config, weight_args.lexical_only);
    let score = composer.score(&parsed.raw_text, &job.text, &weights, &job.must_have, &job.nice_to_have)?;

    println!("{}", serde_json::to_string_pretty(&score)?);
    Ok(())
}

#[derive(Serialize)]
struct GapReport<'a> {
    #[serde(flatten)]
    gaps: &'a GapResult,
    suggestions: &'a Suggestions,
}

pub fn handle_gaps(resume: PathBuf, job_args: JobArgs, json: bool, config: &Config) -> Result<()> {
    validate_file(&resume)?;
    let profiles = ProfileStore::open(config.profiles_path())?;
    let job = JobTarget::resolve(&job_args, &profiles, false)?;
    let tables = advice_tables(config)?;

    let parsed = parser::parse_file(&resume)?;
    let gap = gaps(&parsed.raw_text, &job.must_have, &job.nice_to_have);
    let suggestions = tables.suggestions_from_gaps(&gap);

    if json {
        let report = GapReport {
            gaps: &gap,
            suggestions: &suggestions,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Missing must-have: {}", join_or_none(&gap.missing_must));
    println!("Missing nice-to-have: {}", join_or_none(&gap.missing_nice));
    println!();
    for line in &suggestions.lines {
        println!("- {line}");
    }
    Ok(())
}

fn join_or_none(keywords: &[String]) -> String {
    if keywords.is_empty() {
        "none".to_string()
    } else {
        keywords.join(", ")
    }
}

pub fn handle_suggest(resume: PathBuf, target_role: String, config: &Config) -> Result<()> {
    validate_file(&resume)?;
    let tables = advice_tables(config)?;
    let parsed = parser::parse_file(&resume)?;

    if tables.role_keywords(&target_role).is_none() {
        let known: Vec<&str> = tables.role_names().collect();
        log::info!("Unknown role {:?}; known roles: {}", target_role, known.join(", "));
    }

    for line in tables.suggest_improvements(&parsed.raw_text, &target_role).lines {
        println!("- {line}");
    }
    Ok(())
}

pub fn handle_roles(action: Option<RolesArgs>, config: &Config) -> Result<()> {
    let profiles = ProfileStore::open(config.profiles_path())?;

    match action.unwrap_or(RolesArgs::List {}) {
        RolesArgs::List {} => {
            let roles = profiles.list_roles();
            if roles.is_empty() {
                println!("No role profiles in {}", profiles.dir().display());
            }
            for role in roles {
                println!("{role}");
            }
        }
        RolesArgs::Add {
            name,
            description,
            must,
            nice,
        } => {
            let profile = RoleProfile {
                description,
                keywords: ProfileKeywords {
                    must_have: parse_keywords(&must),
                    nice_to_have: parse_keywords(&nice),
                },
            };
            profiles.save(&name, &profile)?;
            println!("Saved role profile {name}");
        }
    }
    Ok(())
}
