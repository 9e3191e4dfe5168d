use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use opositor::Config;
use opositor::bank::catalog::{Catalog, DEFAULT_SECTION};
use opositor::bank::model::{Letter, Question};
use opositor::exam::selector::{self, CurriculumHalf};
use opositor::exam::session::{AnswerPrompt, ExamOutcome, ExamSession};
use opositor::results::stats;
use opositor::results::store::{self, ResultsStore, SessionKind, SessionResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "opositor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bank root directory (overrides the configured one)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sections of the bank
    Sections,
    /// List the tests of a section
    Tests {
        /// Section label
        section: String,
    },
    /// Sit one whole test, in order
    Lesson {
        /// Section label
        section: String,
        /// Bank file name within the section
        test: String,
    },
    /// Sit twenty questions drawn at random across the whole bank
    Random,
    /// Sit forty questions drawn from one curriculum half
    Half {
        /// Which half of each subject's topic list to draw from
        half: HalfArg,
    },
    /// Show accumulated statistics
    Stats,
    /// Export the session history as CSV
    Export {
        /// Output path
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,
    },
    /// Convert a free-text document into a structured bank file
    Import {
        /// Path to the document
        source: PathBuf,
        /// Destination section
        #[arg(short, long, default_value = DEFAULT_SECTION)]
        section: String,
    },
    /// Create a new section
    AddSection {
        /// Section name (spaces become underscores)
        name: String,
    },
    /// Copy an existing bank file into a section
    AddTest {
        /// Path to the bank file
        source: PathBuf,
        /// Destination section
        #[arg(short, long, default_value = DEFAULT_SECTION)]
        section: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HalfArg {
    First,
    Second,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opositor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let catalog = Catalog::new(cli.root.unwrap_or(config.bank_dir));

    match cli.command {
        Commands::Sections => {
            let sections = catalog.sections()?;
            if sections.is_empty() {
                println!("The bank at {:?} has no sections yet.", catalog.root());
            }
            for section in sections {
                println!("{section}");
            }
        }
        Commands::Tests { section } => {
            let tests = catalog.tests(&section)?;
            if tests.is_empty() {
                println!("No tests in section '{section}'.");
            }
            for test in tests {
                println!("{test}");
            }
        }
        Commands::Lesson { section, test } => {
            let questions = selector::single_test(&catalog, &section, &test)
                .with_context(|| format!("Failed to load test {test:?}"))?;
            let mut store = ResultsStore::load(&config.results_file)?;
            conduct(&mut store, questions, SessionKind::Lesson, Some(section), Some(test))?;
        }
        Commands::Random => {
            let questions = selector::random_exam(&catalog, &mut rand::rng())
                .context("Failed to build a random exam")?;
            let mut store = ResultsStore::load(&config.results_file)?;
            conduct(&mut store, questions, SessionKind::Random20, None, None)?;
        }
        Commands::Half { half } => {
            let (half, kind) = match half {
                HalfArg::First => (CurriculumHalf::First, SessionKind::HalfFirst),
                HalfArg::Second => (CurriculumHalf::Second, SessionKind::HalfSecond),
            };
            let questions = selector::half_exam(&catalog, half, &mut rand::rng())
                .context("Failed to build a curriculum-half exam")?;
            let mut store = ResultsStore::load(&config.results_file)?;
            conduct(&mut store, questions, kind, None, None)?;
        }
        Commands::Stats => {
            let store = ResultsStore::load(&config.results_file)?;
            print_stats(store.results());
        }
        Commands::Export { output } => {
            let store = ResultsStore::load(&config.results_file)?;
            export_csv(store.results(), &output)?;
        }
        Commands::Import { source, section } => {
            let dest = catalog.import_document(&source, &section)?;
            println!("Imported {:?} as {:?}", source, dest);
        }
        Commands::AddSection { name } => {
            let label = catalog.create_section(&name)?;
            println!("Created section '{label}'.");
        }
        Commands::AddTest { source, section } => {
            let dest = catalog.install_test(&source, &section)?;
            println!("Added {:?} to section '{}'.", dest, section);
        }
    }

    Ok(())
}

/// Run one interactive session and record its result
fn conduct(
    store: &mut ResultsStore,
    questions: Vec<Question>,
    kind: SessionKind,
    section: Option<String>,
    test: Option<String>,
) -> Result<()> {
    let session = ExamSession::new(questions)?;
    let outcome = session.run(&mut StdinPrompt);

    println!("\nScore: {}/{} ({:.1}%)", outcome.score, outcome.total, outcome.percentage());

    let result = SessionResult::from_outcome(kind, section, test, &outcome, store::now_local());
    store.append(result)?;

    print_review(&outcome);
    Ok(())
}

/// Answer prompt backed by standard input
struct StdinPrompt;

impl AnswerPrompt for StdinPrompt {
    fn select(&mut self, question: &Question, index: usize, total: usize) -> Option<Letter> {
        println!("\nQuestion {} of {}", index + 1, total);
        println!("{}", textwrap::fill(&question.question, 78));
        for (letter, text) in &question.options {
            println!("  {letter}) {text}");
        }

        loop {
            print!("Answer [A-D, Enter to skip]: ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                return None;
            }
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            if line.len() == 1 {
                if let Some(letter) = line.chars().next().and_then(Letter::from_char) {
                    return Some(letter);
                }
            }
            println!("Answer with a single letter A-D, or press Enter to skip.");
        }
    }
}

/// Print the post-exam review from the answer records
fn print_review(outcome: &ExamOutcome) {
    println!("\nReview");
    println!("======");
    for record in &outcome.answers {
        let marker = if record.is_correct() { '\u{2713}' } else { '\u{2717}' }; // ✓ or ✗
        println!("\n{} {}", marker, textwrap::fill(&record.question, 76));
        println!("    Correct: {}", record.correct_text.as_deref().unwrap_or("(unresolved)"));
        println!("    Yours:   {}", record.selected_text.as_deref().unwrap_or("(not answered)"));
    }
}

/// Print global, per-section, per-kind, and per-day statistics
fn print_stats(results: &[SessionResult]) {
    if results.is_empty() {
        println!("No sessions recorded yet.");
        return;
    }

    let global = stats::global_tally(results);
    println!("Total: {}/{} ({:.1}%)", global.score, global.total, global.percentage());

    println!("\nBy section:");
    for (section, tally) in stats::by_section(results) {
        println!("  {}: {}/{} ({:.1}%)", section, tally.score, tally.total, tally.percentage());
    }

    println!("\nBy type:");
    for (kind, tally) in stats::by_kind(results) {
        println!("  {}: {}/{} ({:.1}%)", kind, tally.score, tally.total, tally.percentage());
    }

    println!("\nBy day:");
    for (day, tally) in stats::by_day(results) {
        println!("  {}: {}/{} ({:.1}%)", day, tally.score, tally.total, tally.percentage());
    }
    if let Some(trend) = stats::daily_trend(results) {
        println!("  Trend: {:+.2} points per day from {:.1}%", trend.slope, trend.intercept);
    }
}

/// Serialize the export rows as CSV (the core only provides the rows)
fn export_csv(results: &[SessionResult], output: &Path) -> Result<()> {
    let mut contents = String::from("date,section,type,test,score,total,percentage\n");
    for row in stats::export_rows(results) {
        contents.push_str(&format!(
            "{},{},{},{},{},{},{:.2}\n",
            row.date.format("%Y-%m-%d %H:%M:%S"),
            csv_field(&row.section),
            row.kind,
            csv_field(&row.test),
            row.score,
            row.total,
            row.percentage,
        ));
    }

    fs::write(output, contents)
        .with_context(|| format!("Failed to write export to {:?}", output))?;
    println!("Exported {} session(s) to {:?}", results.len(), output);
    Ok(())
}

/// Quote a CSV field only when it needs it
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
