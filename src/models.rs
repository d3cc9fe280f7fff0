use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub email: String,
    pub current_gpa: f64,
    pub attendance_rate: f64,
    pub absences: i64,
    pub last_updated: DateTime<Utc>,
}

/// A student record before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentDraft {
    pub name: String,
    pub grade: String,
    pub email: String,
    pub current_gpa: f64,
    pub attendance_rate: f64,
    pub absences: i64,
}

impl StudentDraft {
    pub fn into_student(self, id: String, last_updated: DateTime<Utc>) -> Student {
        Student {
            id,
            name: self.name,
            grade: self.grade,
            email: self.email,
            current_gpa: self.current_gpa,
            attendance_rate: self.attendance_rate,
            absences: self.absences,
            last_updated,
        }
    }
}

/// Severity ordering: `Low < Moderate < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Critical => "Critical Risk",
        }
    }

    pub fn color(&self) -> RiskColor {
        match self {
            RiskLevel::Low => RiskColor::Green,
            RiskLevel::Moderate => RiskColor::Yellow,
            RiskLevel::High => RiskColor::Orange,
            RiskLevel::Critical => RiskColor::Red,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown risk level `{0}`")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(UnknownRiskLevel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Green,
    Yellow,
    Orange,
    Red,
    Gray,
}

impl RiskColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskColor::Green => "green",
            RiskColor::Yellow => "yellow",
            RiskColor::Orange => "orange",
            RiskColor::Red => "red",
            RiskColor::Gray => "gray",
        }
    }
}

impl fmt::Display for RiskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points contributed by each axis of the rule table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub gpa: u32,
    pub attendance: u32,
    pub absences: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.gpa + self.attendance + self.absences
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: u32,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub critical: usize,
}

impl LevelCounts {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Moderate => self.moderate += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Critical => self.critical += 1,
        }
    }

    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high + self.critical
    }

    /// Students at moderate risk or worse.
    pub fn at_risk(&self) -> usize {
        self.moderate + self.high + self.critical
    }

    /// Whole-number percentage of at-risk students, 0 for an empty roster.
    pub fn at_risk_percent(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.at_risk() as f64 / total as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone)]
pub struct StudentScore {
    pub student: Student,
    pub assessment: RiskAssessment,
}
