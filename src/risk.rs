use crate::models::{RiskAssessment, RiskColor, RiskLevel, ScoreBreakdown, Student};

pub const GOOD_STANDING_FACTOR: &str = "Good academic standing";
pub const GOOD_STANDING_RECOMMENDATION: &str = "Continue current performance";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    Below(f64),
    Above(f64),
}

impl Trigger {
    fn matches(&self, value: f64) -> bool {
        match *self {
            Trigger::Below(bound) => value < bound,
            Trigger::Above(bound) => value > bound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub trigger: Trigger,
    pub points: u32,
    pub factor: &'static str,
    pub recommendation: &'static str,
}

/// Bands for one metric, most severe first. The first matching band wins.
pub type BandTable = [Band; 4];

pub const GPA_BANDS: BandTable = [
    Band {
        trigger: Trigger::Below(1.5),
        points: 40,
        factor: "Critically low GPA",
        recommendation: "Immediate academic intervention required",
    },
    Band {
        trigger: Trigger::Below(2.0),
        points: 30,
        factor: "Very low GPA",
        recommendation: "Academic support and tutoring needed",
    },
    Band {
        trigger: Trigger::Below(2.5),
        points: 20,
        factor: "Below average GPA",
        recommendation: "Monitor academic progress closely",
    },
    Band {
        trigger: Trigger::Below(3.0),
        points: 10,
        factor: "Low-average GPA",
        recommendation: "Encourage study habits improvement",
    },
];

pub const ATTENDANCE_BANDS: BandTable = [
    Band {
        trigger: Trigger::Below(60.0),
        points: 40,
        factor: "Critically low attendance",
        recommendation: "Immediate attendance intervention required",
    },
    Band {
        trigger: Trigger::Below(70.0),
        points: 30,
        factor: "Very low attendance",
        recommendation: "Attendance counseling needed",
    },
    Band {
        trigger: Trigger::Below(80.0),
        points: 20,
        factor: "Below average attendance",
        recommendation: "Monitor attendance patterns",
    },
    Band {
        trigger: Trigger::Below(90.0),
        points: 10,
        factor: "Moderate attendance concerns",
        recommendation: "Encourage better attendance",
    },
];

pub const ABSENCE_BANDS: BandTable = [
    Band {
        trigger: Trigger::Above(30.0),
        points: 20,
        factor: "Excessive absences",
        recommendation: "Review reasons for frequent absences",
    },
    Band {
        trigger: Trigger::Above(20.0),
        points: 15,
        factor: "High number of absences",
        recommendation: "Track absence patterns",
    },
    Band {
        trigger: Trigger::Above(15.0),
        points: 10,
        factor: "Moderate absences",
        recommendation: "Monitor absence trends",
    },
    Band {
        trigger: Trigger::Above(10.0),
        points: 5,
        factor: "Some absences noted",
        recommendation: "Keep attendance on track",
    },
];

/// Returns the first band whose trigger matches. NaN matches nothing.
pub fn match_band(table: &BandTable, value: f64) -> Option<&Band> {
    table.iter().find(|band| band.trigger.matches(value))
}

pub fn level_for_score(score: u32) -> RiskLevel {
    match score {
        s if s >= 70 => RiskLevel::Critical,
        s if s >= 45 => RiskLevel::High,
        s if s >= 20 => RiskLevel::Moderate,
        _ => RiskLevel::Low,
    }
}

/// Scores a student against the rule tables.
///
/// Never fails and never clamps: out-of-range metrics are compared as-is,
/// so a negative GPA lands in the most severe band and a NaN in none.
pub fn assess(student: &Student) -> RiskAssessment {
    let mut factors = Vec::new();
    let mut recommendations = Vec::new();

    let mut apply = |table: &BandTable, value: f64| -> u32 {
        match match_band(table, value) {
            Some(band) => {
                factors.push(band.factor.to_string());
                recommendations.push(band.recommendation.to_string());
                band.points
            }
            None => 0,
        }
    };

    let breakdown = ScoreBreakdown {
        gpa: apply(&GPA_BANDS, student.current_gpa),
        attendance: apply(&ATTENDANCE_BANDS, student.attendance_rate),
        absences: apply(&ABSENCE_BANDS, student.absences as f64),
    };

    let score = breakdown.total();
    let level = level_for_score(score);

    if level == RiskLevel::Low {
        factors.push(GOOD_STANDING_FACTOR.to_string());
        recommendations.push(GOOD_STANDING_RECOMMENDATION.to_string());
    }

    RiskAssessment {
        level,
        score,
        factors,
        recommendations,
        breakdown,
    }
}

/// Color for a raw level name; anything unrecognized is gray.
pub fn color_of(level: &str) -> RiskColor {
    level
        .parse::<RiskLevel>()
        .map(|level| level.color())
        .unwrap_or(RiskColor::Gray)
}

/// Display label for a raw level name; anything unrecognized is "Unknown".
pub fn label_of(level: &str) -> &'static str {
    level
        .parse::<RiskLevel>()
        .map(|level| level.label())
        .unwrap_or("Unknown")
}
