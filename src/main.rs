use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod form;
mod models;
mod report;
mod risk;
mod roster;
mod store;

use form::StudentForm;
use models::{RiskAssessment, RiskLevel, Student};
use roster::StudentEdits;
use store::StudentStore;

#[derive(Parser)]
#[command(name = "student-early-warning")]
#[command(about = "Student academic risk scoring and early warning reports", long_about = None)]
struct Cli {
    /// Roster CSV; read-only commands fall back to a sample roster when unset
    #[arg(long, global = true, env = "EARLY_WARNING_ROSTER")]
    roster: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single record without touching the roster
    #[command(allow_negative_numbers = true)]
    Assess {
        #[arg(long)]
        gpa: f64,
        #[arg(long)]
        attendance: f64,
        #[arg(long)]
        absences: i64,
        #[arg(long)]
        json: bool,
    },
    /// Rank students by risk score
    Score {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Only show students at this level (low, moderate, high, critical)
        #[arg(long)]
        level: Option<String>,
    },
    /// Show level counts and the at-risk share
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print display label and color for risk level names
    Legend {
        levels: Vec<String>,
    },
    /// Write the sample roster to a CSV file
    Seed {
        #[arg(long)]
        out: PathBuf,
    },
    /// Add a student to the roster
    Add(StudentFields),
    /// Edit a student on the roster; omitted fields keep their values
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        edits: EditFields,
    },
    /// Remove a student from the roster
    Remove {
        #[arg(long)]
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Raw form fields; validation happens in `StudentForm`.
#[derive(Args)]
struct StudentFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    grade: String,
    #[arg(long, allow_hyphen_values = true)]
    gpa: String,
    #[arg(long, allow_hyphen_values = true)]
    attendance: String,
    #[arg(long, allow_hyphen_values = true)]
    absences: String,
    #[arg(long)]
    email: String,
}

impl From<StudentFields> for StudentForm {
    fn from(fields: StudentFields) -> Self {
        StudentForm {
            name: fields.name,
            grade: fields.grade,
            current_gpa: fields.gpa,
            attendance_rate: fields.attendance,
            absences: fields.absences,
            email: fields.email,
        }
    }
}

#[derive(Args)]
struct EditFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    grade: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    gpa: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    attendance: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    absences: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

impl From<EditFields> for StudentEdits {
    fn from(fields: EditFields) -> Self {
        StudentEdits {
            name: fields.name,
            grade: fields.grade,
            current_gpa: fields.gpa,
            attendance_rate: fields.attendance,
            absences: fields.absences,
            email: fields.email,
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("EARLY_WARNING_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Assess {
            gpa,
            attendance,
            absences,
            json,
        } => {
            let student = Student {
                id: "adhoc".to_string(),
                name: "Ad hoc record".to_string(),
                grade: String::new(),
                email: String::new(),
                current_gpa: gpa,
                attendance_rate: attendance,
                absences,
                last_updated: Utc::now(),
            };
            let assessment = risk::assess(&student);

            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                print_assessment(&assessment);
            }
        }
        Commands::Score { limit, level } => {
            let level = report::parse_level_filter(level.as_deref())
                .context("--level must be one of low, moderate, high, critical")?;

            let store = roster::load_or_sample(cli.roster.as_deref())?;
            if store.is_empty() {
                println!("No students on the roster.");
                return Ok(());
            }

            let scores = report::rank_in_level(store.students(), level);
            if scores.is_empty() {
                println!("No students match.");
                return Ok(());
            }

            println!("Students by risk score:");
            for score in scores.iter().take(limit) {
                println!(
                    "- {} ({}, {}) score {} {}",
                    score.student.name,
                    score.student.grade,
                    score.student.email,
                    score.assessment.score,
                    report::badge(score.assessment.level)
                );
            }
        }
        Commands::Summary { json } => {
            let store = roster::load_or_sample(cli.roster.as_deref())?;
            let counts = report::count_levels(store.students());

            if json {
                let summary = serde_json::json!({
                    "total": counts.total(),
                    "at_risk": counts.at_risk(),
                    "at_risk_percent": counts.at_risk_percent(),
                    "levels": counts,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("{}", "Roster summary".bold());
            println!("  Total students : {}", counts.total());
            println!(
                "  At risk        : {} ({}% of students)",
                counts.at_risk(),
                counts.at_risk_percent()
            );
            println!("  Critical risk  : {}", counts.critical);
            println!("  Low risk       : {}", counts.low);
            println!();
            for level in RiskLevel::ALL {
                println!("  {:<24} {}", report::badge(level), counts.get(level));
            }
        }
        Commands::Report { out } => {
            let store = roster::load_or_sample(cli.roster.as_deref())?;
            let markdown = report::build_report(store.students(), Utc::now());
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Legend { levels } => {
            let levels = if levels.is_empty() {
                RiskLevel::ALL.iter().map(|level| level.to_string()).collect()
            } else {
                levels
            };
            for raw in &levels {
                let color = risk::color_of(raw);
                println!(
                    "{:<10} {:<14} {}",
                    raw,
                    report::paint(risk::label_of(raw), color),
                    color
                );
            }
        }
        Commands::Seed { out } => {
            let store = StudentStore::sample();
            store.save_csv(&out)?;
            println!(
                "Sample roster of {} students written to {}.",
                store.len(),
                out.display()
            );
        }
        Commands::Add(fields) => {
            let path = roster::require_roster(cli.roster.as_deref())?;
            let student = roster::add_student(path, &StudentForm::from(fields))?;

            println!("Added {} ({}).", student.name, student.id);
            print_assessment(&risk::assess(&student));
        }
        Commands::Update { id, edits } => {
            let path = roster::require_roster(cli.roster.as_deref())?;
            let student = roster::update_student(path, &id, StudentEdits::from(edits))?;

            println!("Updated {} ({}).", student.name, student.id);
            print_assessment(&risk::assess(&student));
        }
        Commands::Remove { id, yes } => {
            let path = roster::require_roster(cli.roster.as_deref())?;
            let removed = roster::remove_student(path, &id, yes)?;
            println!("Removed {}.", removed.name);
        }
    }

    Ok(())
}

fn print_assessment(assessment: &RiskAssessment) {
    println!(
        "{} score {} (GPA {} + attendance {} + absences {})",
        report::badge(assessment.level),
        assessment.score,
        assessment.breakdown.gpa,
        assessment.breakdown.attendance,
        assessment.breakdown.absences
    );
    for (factor, recommendation) in assessment
        .factors
        .iter()
        .zip(assessment.recommendations.iter())
    {
        println!("  - {factor}: {recommendation}");
    }
}
