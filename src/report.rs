use std::fmt::Write;

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

use crate::models::{
    LevelCounts, RiskColor, RiskLevel, Student, StudentScore, UnknownRiskLevel,
};
use crate::risk;

pub fn count_levels(students: &[Student]) -> LevelCounts {
    let mut counts = LevelCounts::default();
    for student in students {
        counts.record(risk::assess(student).level);
    }
    counts
}

/// Highest score first; equal scores keep roster order.
pub fn rank_students(students: &[Student]) -> Vec<StudentScore> {
    let mut scores: Vec<StudentScore> = students
        .iter()
        .map(|student| StudentScore {
            student: student.clone(),
            assessment: risk::assess(student),
        })
        .collect();

    scores.sort_by(|a, b| b.assessment.score.cmp(&a.assessment.score));
    scores
}

pub fn students_in_level(students: &[Student], level: RiskLevel) -> Vec<&Student> {
    students
        .iter()
        .filter(|student| risk::assess(student).level == level)
        .collect()
}

/// Ranks every student, or only those at `level` when one is given.
pub fn rank_in_level(students: &[Student], level: Option<RiskLevel>) -> Vec<StudentScore> {
    match level {
        Some(level) => {
            let selected: Vec<Student> = students_in_level(students, level)
                .into_iter()
                .cloned()
                .collect();
            rank_students(&selected)
        }
        None => rank_students(students),
    }
}

pub fn parse_level_filter(raw: Option<&str>) -> Result<Option<RiskLevel>, UnknownRiskLevel> {
    raw.map(|value| value.parse::<RiskLevel>()).transpose()
}

pub fn badge(level: RiskLevel) -> ColoredString {
    paint(level.label(), level.color())
}

pub fn paint(text: &str, color: RiskColor) -> ColoredString {
    match color {
        RiskColor::Green => text.green(),
        RiskColor::Yellow => text.yellow(),
        RiskColor::Orange => text.truecolor(255, 165, 0),
        RiskColor::Red => text.red(),
        RiskColor::Gray => text.bright_black(),
    }
}

pub fn build_report(students: &[Student], generated_at: DateTime<Utc>) -> String {
    let counts = count_levels(students);
    let scores = rank_students(students);

    let mut output = String::new();

    let _ = writeln!(output, "# Student Early Warning Report");
    let _ = writeln!(
        output,
        "Generated {} for {} students",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        students.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Total students: {}", counts.total());
    let _ = writeln!(
        output,
        "- At risk: {} ({}% of students)",
        counts.at_risk(),
        counts.at_risk_percent()
    );
    let _ = writeln!(
        output,
        "- Critical risk: {} (immediate attention needed)",
        counts.critical
    );
    let _ = writeln!(output, "- Low risk: {} (performing well)", counts.low);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Distribution");
    for level in RiskLevel::ALL {
        let _ = writeln!(
            output,
            "- {} ({}): {}",
            level.label(),
            level.color(),
            counts.get(level)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Students");

    if scores.is_empty() {
        let _ = writeln!(output, "No students on the roster.");
    } else {
        for score in scores.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}, {}) score {} [{}]",
                score.student.name,
                score.student.grade,
                score.student.email,
                score.assessment.score,
                score.assessment.level.label()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Interventions");

    for score in scores.iter() {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "### {} ({})",
            score.student.name,
            score.assessment.level.label()
        );
        let _ = writeln!(
            output,
            "GPA {:.2}, attendance {:.1}%, {} absences",
            score.student.current_gpa, score.student.attendance_rate, score.student.absences
        );
        for (factor, recommendation) in score
            .assessment
            .factors
            .iter()
            .zip(score.assessment.recommendations.iter())
        {
            let _ = writeln!(output, "- {}: {}", factor, recommendation);
        }
    }

    output
}
