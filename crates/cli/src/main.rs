use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use triage_caselog::CaseLog;
use triage_core::config::path_from_env_value;
use triage_core::{Case, TriageService, DISCLAIMER};
use triage_dataset::{
    clean_cases, evaluate_cases, generate_cases, load_cases, write_json, write_training_jsonl,
    DEFAULT_SEED,
};
use triage_types::{CapRefill, Vitals};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "START triage engine and dataset tooling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a single case
    Classify {
        /// Free-text description of the patient
        description: String,
        /// Respiratory rate in breaths per minute (0 means apnea)
        #[arg(long)]
        rr: Option<f64>,
        /// Pulse quality: strong, normal, weak or none
        #[arg(long)]
        pulse: Option<String>,
        /// Capillary refill in seconds, or a comparison such as ">2"
        #[arg(long)]
        cap_refill: Option<String>,
        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score the engine against a labelled dataset
    Evaluate {
        /// JSON array or JSON-lines file of labelled cases
        input: PathBuf,
        /// List every mismatching case
        #[arg(long)]
        verbose: bool,
    },
    /// Normalise a dataset and split out rejected cases
    Clean {
        /// JSON array or JSON-lines file of labelled cases
        input: PathBuf,
        /// Clean output (default: <input>.clean.json)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Rejects output (default: <input>.rejects.json)
        #[arg(long)]
        rejects: Option<PathBuf>,
    },
    /// Generate the synthetic 200-case dataset
    Generate {
        /// Random seed
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Output path
        #[arg(long, default_value = "datasets/cases_expanded.json")]
        out: PathBuf,
    },
    /// Export a labelled dataset as instruction-tuning JSON lines
    ExportTrain {
        /// JSON array or JSON-lines file of labelled cases
        input: PathBuf,
        /// Output path
        #[arg(long, default_value = "datasets/train.jsonl")]
        out: PathBuf,
    },
    /// Show recent entries from the persistent case log
    History {
        /// SQLite case log (default: $TRIAGE_CASE_DB)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Number of entries
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("triage=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Classify {
            description,
            rr,
            pulse,
            cap_refill,
            json,
        }) => {
            let vitals = Vitals::new(rr, pulse.as_deref(), cap_refill.as_deref().map(parse_cap_refill));
            let assessment = TriageService::new().assess(&Case::new(description, vitals));

            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                println!(
                    "{} ({}, confidence {:.2})",
                    assessment.decision.level, assessment.decision.reason, assessment.confidence
                );
                println!("{}", assessment.rule_reasoning);
                for action in assessment.actions {
                    println!("  - {action}");
                }
                println!("{DISCLAIMER}");
            }
        }
        Some(Commands::Evaluate { input, verbose }) => {
            let cases = load_cases(&input)?;
            let evaluation = evaluate_cases(&cases);

            println!(
                "Accuracy: {:.1}% ({}/{}), skipped {}",
                evaluation.accuracy() * 100.0,
                evaluation.correct,
                evaluation.scored,
                evaluation.skipped
            );
            for tally in &evaluation.per_level {
                println!("  {:<10} {}/{}", tally.level, tally.correct, tally.expected);
            }
            if verbose {
                for m in &evaluation.mismatches {
                    println!(
                        "#{} expected {} got {} ({}): {}",
                        m.index, m.expected, m.predicted, m.reason, m.description
                    );
                }
            } else if !evaluation.mismatches.is_empty() {
                println!("{} mismatches (use --verbose to list)", evaluation.mismatches.len());
            }
        }
        Some(Commands::Clean {
            input,
            out,
            rejects,
        }) => {
            let cases = load_cases(&input)?;
            let report = clean_cases(cases);
            let out = out.unwrap_or_else(|| sibling(&input, "clean.json"));
            let rejects = rejects.unwrap_or_else(|| sibling(&input, "rejects.json"));

            write_json(&out, &report.clean)?;
            write_json(&rejects, &report.rejects)?;

            println!("Input: {}", report.total());
            println!("Clean: {}", report.clean.len());
            println!("Rejects: {} (see {})", report.rejects.len(), rejects.display());
            println!("Wrote clean dataset to {}", out.display());
        }
        Some(Commands::Generate { seed, out }) => {
            let cases = generate_cases(seed);
            write_json(&out, &cases)?;
            println!("Wrote {} cases to {}", cases.len(), out.display());
        }
        Some(Commands::ExportTrain { input, out }) => {
            let cases = load_cases(&input)?;
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let written = write_training_jsonl(&cases, BufWriter::new(File::create(&out)?))?;
            println!("Wrote {written} training rows to {}", out.display());
        }
        Some(Commands::History { db, limit }) => {
            let Some(db) = db.or_else(|| path_from_env_value(std::env::var("TRIAGE_CASE_DB").ok()))
            else {
                eprintln!("No case log given. Use --db or set TRIAGE_CASE_DB.");
                return Ok(());
            };

            let log = CaseLog::open(&db)?;
            let records = log.recent(limit)?;
            if records.is_empty() {
                println!("No cases found.");
            }
            for record in records {
                println!(
                    "{} {:<9} {:<22} {:.2} {}",
                    record.ts.format("%Y-%m-%d %H:%M:%S"),
                    record.triage_level,
                    record.reason_code,
                    record.confidence,
                    record.description
                );
            }
        }
        None => {
            println!("No command given. Use --help to list commands.");
        }
    }

    Ok(())
}

/// Numeric input becomes seconds; anything else is kept as text for the engine to interpret.
fn parse_cap_refill(raw: &str) -> CapRefill {
    match raw.trim().parse::<f64>() {
        Ok(secs) => CapRefill::Seconds(secs),
        Err(_) => CapRefill::Text(raw.to_string()),
    }
}

/// `data/cases.json` + `clean.json` -> `data/cases.clean.json`
fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cases".into());
    input.with_file_name(format!("{stem}.{suffix}"))
}
