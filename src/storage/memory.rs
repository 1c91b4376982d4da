//! In-process RSVP table, used by `serve --in-memory` and by the tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::error::AppError;
use crate::models::rsvp::{Attendance, NewRsvp, Rsvp, SubmitOutcome};

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<i32, Rsvp>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, AppError> {
        self.table
            .lock()
            .map_err(|_| AppError::Internal("RSVP table lock poisoned".into()))
    }

    pub fn submit(&self, rsvp: &NewRsvp) -> Result<SubmitOutcome, AppError> {
        let mut table = self.lock()?;
        let now = Utc::now();

        if let Some(existing) = table.rows.values_mut().find(|r| r.name == rsvp.name) {
            existing.attendance = rsvp.attendance;
            existing.recorded_at = now;
            return Ok(SubmitOutcome::Updated(existing.id));
        }

        table.next_id += 1;
        let id = table.next_id;
        table.rows.insert(
            id,
            Rsvp {
                id,
                name: rsvp.name.clone(),
                attendance: rsvp.attendance,
                recorded_at: now,
            },
        );
        Ok(SubmitOutcome::Created(id))
    }

    pub fn list_confirmed(&self) -> Result<Vec<String>, AppError> {
        let table = self.lock()?;
        let mut names: Vec<String> = table
            .rows
            .values()
            .filter(|r| r.attendance == Attendance::Yes)
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn list_all(&self) -> Result<Vec<Rsvp>, AppError> {
        let table = self.lock()?;
        let mut all: Vec<Rsvp> = table.rows.values().cloned().collect();
        all.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(all)
    }

    pub fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.lock()?.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn rsvp(name: &str, attendance: &str) -> NewRsvp {
        NewRsvp::parse(name, attendance).unwrap()
    }

    #[test]
    fn first_submission_creates_a_record() {
        let store = MemoryStore::new();
        let outcome = store.submit(&rsvp("Ana", "yes")).unwrap();
        assert_eq!(outcome, SubmitOutcome::Created(1));

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Ana");
        assert_eq!(all[0].attendance, Attendance::Yes);
    }

    #[tokio::test]
    async fn resubmitting_a_name_updates_in_place() {
        let store = MemoryStore::new();
        let created = store.submit(&rsvp("Ana", "YES")).unwrap();
        let before = store.list_all().unwrap()[0].recorded_at;

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = store.submit(&rsvp("  Ana ", "no")).unwrap();

        assert_eq!(updated, SubmitOutcome::Updated(created.id()));
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].attendance, Attendance::No);
        assert!(all[0].recorded_at > before);
    }

    #[test]
    fn names_are_matched_exactly() {
        let store = MemoryStore::new();
        store.submit(&rsvp("Ana", "YES")).unwrap();
        store.submit(&rsvp("ana", "YES")).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn confirmed_lists_only_yes_sorted() {
        let store = MemoryStore::new();
        store.submit(&rsvp("Beto", "NO")).unwrap();
        store.submit(&rsvp("Zeca", "YES")).unwrap();
        store.submit(&rsvp("Ana", "YES")).unwrap();
        assert_eq!(store.list_confirmed().unwrap(), vec!["Ana", "Zeca"]);
    }

    #[tokio::test]
    async fn list_all_is_most_recent_first() {
        let store = MemoryStore::new();
        store.submit(&rsvp("Ana", "YES")).unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        store.submit(&rsvp("Beto", "NO")).unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        store.submit(&rsvp("Ana", "NO")).unwrap();

        let names: Vec<String> = store.list_all().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Ana", "Beto"]);
    }

    #[test]
    fn delete_removes_only_the_target_and_is_idempotent() {
        let store = MemoryStore::new();
        let ana = store.submit(&rsvp("Ana", "YES")).unwrap().id();
        store.submit(&rsvp("Beto", "YES")).unwrap();

        assert!(!store.delete(999).unwrap());
        assert_eq!(store.list_all().unwrap().len(), 2);

        assert!(store.delete(ana).unwrap());
        assert!(!store.delete(ana).unwrap());
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Beto");
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = store.submit(&rsvp("Ana", "YES")).unwrap().id();
        store.delete(first).unwrap();
        let second = store.submit(&rsvp("Ana", "YES")).unwrap();
        assert_eq!(second, SubmitOutcome::Created(first + 1));
    }
}
