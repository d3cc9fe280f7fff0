use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Student, StudentDraft};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no student with id `{0}`")]
    NotFound(String),
    #[error("roster lists student id `{0}` more than once")]
    DuplicateId(String),
    #[error("failed to read or write roster")]
    Csv(#[from] csv::Error),
    #[error("failed to write roster")]
    Io(#[from] std::io::Error),
}

/// In-memory student list keyed by id, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct StudentStore {
    students: Vec<Student>,
}

impl StudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo roster used when no roster file is supplied.
    pub fn sample() -> Self {
        let mut store = Self::new();
        let drafts = vec![
            ("Emma Johnson", "Grade 10", 2.1, 75.0, 15, "emma.johnson@school.edu"),
            ("Marcus Chen", "Grade 11", 3.8, 95.0, 3, "marcus.chen@school.edu"),
            ("Sofia Rodriguez", "Grade 9", 2.5, 68.0, 22, "sofia.rodriguez@school.edu"),
        ];

        for (name, grade, gpa, attendance, absences, email) in drafts {
            store.add(StudentDraft {
                name: name.to_string(),
                grade: grade.to_string(),
                email: email.to_string(),
                current_gpa: gpa,
                attendance_rate: attendance,
                absences,
            });
        }

        store
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn add(&mut self, draft: StudentDraft) -> &Student {
        let student = draft.into_student(Uuid::new_v4().to_string(), Utc::now());
        tracing::debug!(id = %student.id, name = %student.name, "student added");
        let index = self.students.len();
        self.students.push(student);
        &self.students[index]
    }

    pub fn update(&mut self, id: &str, draft: StudentDraft) -> Result<&Student, StoreError> {
        let slot = self
            .students
            .iter_mut()
            .find(|student| student.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        *slot = draft.into_student(id.to_string(), Utc::now());
        tracing::debug!(id, "student updated");
        Ok(&*slot)
    }

    pub fn remove(&mut self, id: &str) -> Result<Student, StoreError> {
        let index = self
            .students
            .iter()
            .position(|student| student.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        tracing::debug!(id, "student removed");
        Ok(self.students.remove(index))
    }

    pub fn load_csv(path: &Path) -> Result<Self, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut seen = HashSet::new();
        let mut students = Vec::new();

        for result in reader.deserialize::<Student>() {
            let student = result?;
            if !seen.insert(student.id.clone()) {
                return Err(StoreError::DuplicateId(student.id));
            }
            students.push(student);
        }

        tracing::info!(path = %path.display(), count = students.len(), "roster loaded");
        Ok(Self { students })
    }

    pub fn save_csv(&self, path: &Path) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path)?;
        for student in &self.students {
            writer.serialize(student)?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), count = self.students.len(), "roster saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, gpa: f64) -> StudentDraft {
        StudentDraft {
            name: name.to_string(),
            grade: "Grade 11".to_string(),
            email: format!("{}@school.edu", name.to_lowercase()),
            current_gpa: gpa,
            attendance_rate: 88.0,
            absences: 4,
        }
    }

    #[test]
    fn add_assigns_unique_ids() {
        let mut store = StudentStore::new();
        let first = store.add(draft("Avery", 3.1)).id.clone();
        let second = store.add(draft("Jules", 2.2)).id.clone();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&first).map(|s| s.name.as_str()), Some("Avery"));
    }

    #[test]
    fn update_keeps_id_and_position() {
        let mut store = StudentStore::new();
        let id = store.add(draft("Avery", 3.1)).id.clone();
        store.add(draft("Jules", 2.2));
        let before = store.get(&id).map(|s| s.last_updated);

        let updated = store.update(&id, draft("Avery", 1.4)).unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.current_gpa, 1.4);
        assert!(Some(updated.last_updated) >= before);
        assert_eq!(store.students()[0].id, id);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut store = StudentStore::sample();
        assert!(matches!(
            store.update("missing", draft("Nobody", 2.0)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.remove("missing"), Err(StoreError::NotFound(_))));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn remove_returns_the_deleted_student() {
        let mut store = StudentStore::sample();
        let id = store.students()[1].id.clone();
        let removed = store.remove(&id).unwrap();

        assert_eq!(removed.name, "Marcus Chen");
        assert_eq!(store.len(), 2);
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn roster_survives_a_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        let store = StudentStore::sample();

        store.save_csv(&path).unwrap();
        let loaded = StudentStore::load_csv(&path).unwrap();

        assert_eq!(loaded.students(), store.students());
    }

    #[test]
    fn duplicate_ids_in_roster_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        std::fs::write(
            &path,
            "id,name,grade,email,current_gpa,attendance_rate,absences,last_updated\n\
             a,Avery Lee,Grade 9,avery@school.edu,3.2,91,2,2026-02-02T10:00:00Z\n\
             a,Jules Moreno,Grade 10,jules@school.edu,2.2,71,12,2026-02-02T10:00:00Z\n",
        )
        .unwrap();

        assert!(matches!(
            StudentStore::load_csv(&path),
            Err(StoreError::DuplicateId(id)) if id == "a"
        ));
    }
}
