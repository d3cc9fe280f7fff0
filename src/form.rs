use thiserror::Error;

use crate::models::{Student, StudentDraft};

pub const GRADE_LEVELS: [&str; 4] = ["Grade 9", "Grade 10", "Grade 11", "Grade 12"];

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("{field} must be a number, got `{value}`")]
    InvalidNumber { field: &'static str, value: String },
    #[error("GPA must be between 0.0 and 4.0")]
    GpaOutOfRange(f64),
    #[error("Attendance rate must be between 0 and 100")]
    AttendanceOutOfRange(f64),
    #[error("Absences cannot be negative")]
    NegativeAbsences(i64),
    #[error("unknown grade level `{0}`")]
    UnknownGrade(String),
}

/// Raw field values as typed by a user, before any parsing.
#[derive(Debug, Clone, Default)]
pub struct StudentForm {
    pub name: String,
    pub grade: String,
    pub current_gpa: String,
    pub attendance_rate: String,
    pub absences: String,
    pub email: String,
}

impl StudentForm {
    /// Pre-fills the form from an existing record for editing.
    pub fn from_student(student: &Student) -> Self {
        StudentForm {
            name: student.name.clone(),
            grade: student.grade.clone(),
            current_gpa: student.current_gpa.to_string(),
            attendance_rate: student.attendance_rate.to_string(),
            absences: student.absences.to_string(),
            email: student.email.clone(),
        }
    }

    pub fn validate(&self) -> Result<StudentDraft, FormError> {
        let fields = [
            &self.name,
            &self.grade,
            &self.current_gpa,
            &self.attendance_rate,
            &self.absences,
            &self.email,
        ];
        if fields.iter().any(|value| value.trim().is_empty()) {
            return Err(FormError::MissingFields);
        }

        let gpa = parse_number("GPA", &self.current_gpa)?;
        if !(0.0..=4.0).contains(&gpa) {
            return Err(FormError::GpaOutOfRange(gpa));
        }

        let attendance = parse_number("Attendance rate", &self.attendance_rate)?;
        if !(0.0..=100.0).contains(&attendance) {
            return Err(FormError::AttendanceOutOfRange(attendance));
        }

        let absences: i64 = self
            .absences
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidNumber {
                field: "Absences",
                value: self.absences.clone(),
            })?;
        if absences < 0 {
            return Err(FormError::NegativeAbsences(absences));
        }

        let grade = self.grade.trim();
        if !GRADE_LEVELS.contains(&grade) {
            return Err(FormError::UnknownGrade(grade.to_string()));
        }

        Ok(StudentDraft {
            name: self.name.trim().to_string(),
            grade: grade.to_string(),
            email: self.email.trim().to_string(),
            current_gpa: gpa,
            attendance_rate: attendance,
            absences,
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FormError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}
