use std::path::Path;

use anyhow::{bail, Context};

use crate::form::StudentForm;
use crate::models::Student;
use crate::store::StudentStore;

/// Field overrides for an edit; unset fields keep the stored value.
#[derive(Debug, Default, Clone)]
pub struct StudentEdits {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub current_gpa: Option<String>,
    pub attendance_rate: Option<String>,
    pub absences: Option<String>,
    pub email: Option<String>,
}

impl StudentEdits {
    pub fn apply(self, form: &mut StudentForm) {
        let overrides = [
            (self.name, &mut form.name),
            (self.grade, &mut form.grade),
            (self.current_gpa, &mut form.current_gpa),
            (self.attendance_rate, &mut form.attendance_rate),
            (self.absences, &mut form.absences),
            (self.email, &mut form.email),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

pub fn require_roster(roster: Option<&Path>) -> anyhow::Result<&Path> {
    roster.context("--roster or EARLY_WARNING_ROSTER must be set to modify a roster")
}

pub fn load_or_sample(roster: Option<&Path>) -> anyhow::Result<StudentStore> {
    match roster {
        Some(path) => StudentStore::load_csv(path)
            .with_context(|| format!("failed to load roster {}", path.display())),
        None => {
            tracing::info!("no roster given, using sample roster");
            Ok(StudentStore::sample())
        }
    }
}

pub fn load_or_empty(path: &Path) -> anyhow::Result<StudentStore> {
    if path.exists() {
        StudentStore::load_csv(path)
            .with_context(|| format!("failed to load roster {}", path.display()))
    } else {
        tracing::info!(path = %path.display(), "roster does not exist yet, starting empty");
        Ok(StudentStore::new())
    }
}

pub fn add_student(path: &Path, form: &StudentForm) -> anyhow::Result<Student> {
    let draft = form.validate()?;
    let mut store = load_or_empty(path)?;
    let student = store.add(draft).clone();
    store.save_csv(path)?;
    Ok(student)
}

/// Pre-fills the form from the stored record, applies `edits`, then validates.
pub fn update_student(path: &Path, id: &str, edits: StudentEdits) -> anyhow::Result<Student> {
    let mut store = StudentStore::load_csv(path)
        .with_context(|| format!("failed to load roster {}", path.display()))?;
    let existing = store
        .get(id)
        .with_context(|| format!("no student with id `{id}`"))?;

    let mut form = StudentForm::from_student(existing);
    edits.apply(&mut form);
    let draft = form.validate()?;

    let student = store.update(id, draft)?.clone();
    store.save_csv(path)?;
    Ok(student)
}

pub fn remove_student(path: &Path, id: &str, confirmed: bool) -> anyhow::Result<Student> {
    let mut store = StudentStore::load_csv(path)
        .with_context(|| format!("failed to load roster {}", path.display()))?;
    let name = store
        .get(id)
        .map(|student| student.name.clone())
        .with_context(|| format!("no student with id `{id}`"))?;

    if !confirmed {
        bail!("refusing to remove {name} without --yes");
    }

    let removed = store.remove(id)?;
    store.save_csv(path)?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str) -> StudentForm {
        StudentForm {
            name: name.to_string(),
            grade: "Grade 10".to_string(),
            current_gpa: "2.1".to_string(),
            attendance_rate: "75".to_string(),
            absences: "15".to_string(),
            email: format!("{}@school.edu", name.to_lowercase()),
        }
    }

    #[test]
    fn mutating_without_a_roster_is_an_error() {
        let err = require_roster(None).unwrap_err();
        assert!(err.to_string().contains("EARLY_WARNING_ROSTER"));
        assert!(require_roster(Some(Path::new("roster.csv"))).is_ok());
    }

    #[test]
    fn missing_roster_falls_back_to_sample() {
        let store = load_or_sample(None).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn add_creates_a_roster_that_does_not_exist_yet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        assert!(!path.exists());

        let student = add_student(&path, &form("Avery")).unwrap();

        let loaded = StudentStore::load_csv(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.students()[0].id, student.id);
    }

    #[test]
    fn add_appends_to_an_existing_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        StudentStore::sample().save_csv(&path).unwrap();

        add_student(&path, &form("Avery")).unwrap();

        assert_eq!(StudentStore::load_csv(&path).unwrap().len(), 4);
    }

    #[test]
    fn invalid_form_leaves_roster_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        let mut bad = form("Avery");
        bad.current_gpa = "5".to_string();

        let err = add_student(&path, &bad).unwrap_err();
        assert_eq!(err.to_string(), "GPA must be between 0.0 and 4.0");
        assert!(!path.exists());
    }

    #[test]
    fn update_changes_only_the_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        let original = add_student(&path, &form("Avery")).unwrap();

        let edits = StudentEdits {
            current_gpa: Some("3.6".to_string()),
            ..StudentEdits::default()
        };
        let updated = update_student(&path, &original.id, edits).unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.current_gpa, 3.6);
        assert_eq!(updated.name, original.name);
        assert_eq!(updated.attendance_rate, original.attendance_rate);
        assert_eq!(updated.absences, original.absences);

        let loaded = StudentStore::load_csv(&path).unwrap();
        assert_eq!(loaded.get(&original.id).map(|s| s.current_gpa), Some(3.6));
    }

    #[test]
    fn update_rejects_out_of_range_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        let original = add_student(&path, &form("Avery")).unwrap();

        let edits = StudentEdits {
            absences: Some("-3".to_string()),
            ..StudentEdits::default()
        };
        let err = update_student(&path, &original.id, edits).unwrap_err();
        assert_eq!(err.to_string(), "Absences cannot be negative");

        let loaded = StudentStore::load_csv(&path).unwrap();
        assert_eq!(loaded.get(&original.id).map(|s| s.absences), Some(15));
    }

    #[test]
    fn remove_refuses_without_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        let student = add_student(&path, &form("Avery")).unwrap();

        let err = remove_student(&path, &student.id, false).unwrap_err();
        assert!(err.to_string().contains("without --yes"));
        assert_eq!(StudentStore::load_csv(&path).unwrap().len(), 1);

        let removed = remove_student(&path, &student.id, true).unwrap();
        assert_eq!(removed.name, "Avery");
        assert!(StudentStore::load_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn remove_reports_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        add_student(&path, &form("Avery")).unwrap();

        let err = remove_student(&path, "missing", true).unwrap_err();
        assert!(err.to_string().contains("no student with id `missing`"));
    }
}
