use std::path::Path;

use tracing::{debug, info};

use crate::record::Record;
use crate::result::{DbResult, StudentBaseError};
use crate::snapshot;

/// An ordered, in-memory table of student records.
///
/// Records are kept in insertion order. Every lookup is a linear scan and,
/// where several records match, the earliest inserted one wins.
///
/// The table owns its id counter. Ids are never reused: deleting the record
/// with the highest id does not lower the counter, and the counter is stored
/// in snapshots alongside the records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    records: Vec<Record>,
    next_id: u64,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Create an empty table. The first inserted record gets id `1`.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a table from decoded snapshot parts.
    ///
    /// Ids must be strictly increasing in sequence order and all below
    /// `next_id`, and `next_id` must leave room for another insert.
    pub(crate) fn from_parts(next_id: u64, records: Vec<Record>) -> DbResult<Self> {
        if next_id == 0 {
            return Err(StudentBaseError::Corrupt("next id is zero".to_owned()));
        }
        if next_id == u64::MAX {
            return Err(StudentBaseError::Corrupt("next id is exhausted".to_owned()));
        }

        let mut last = 0;
        for record in &records {
            if record.id <= last {
                return Err(StudentBaseError::Corrupt(format!(
                    "record id {} is out of order",
                    record.id
                )));
            }
            if record.id >= next_id {
                return Err(StudentBaseError::Corrupt(format!(
                    "record id {} is not below next id {}",
                    record.id, next_id
                )));
            }
            last = record.id;
        }

        Ok(Self { records, next_id })
    }

    /// Insert a new record and return it.
    ///
    /// # Arguments
    ///
    /// * `name` - Student name. Not checked for uniqueness.
    /// * `course` - Course name.
    /// * `score` - Marks obtained.
    /// * `city` - Home city.
    ///
    /// # Returns
    ///
    /// The inserted [`Record`], carrying its newly assigned id.
    pub fn insert(&mut self, name: &str, course: &str, score: i64, city: &str) -> &Record {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(Record::new(id, name, course, score, city));

        debug!(id, student = name, "inserted record");

        // Just pushed.
        &self.records[self.records.len() - 1]
    }

    /// All records in insertion order, or [`None`] if the table is empty.
    pub fn list_all(&self) -> Option<&[Record]> {
        if self.records.is_empty() {
            None
        } else {
            Some(&self.records)
        }
    }

    /// Iterate over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Select a record by its id.
    ///
    /// # Returns
    ///
    /// An [`Option`] containing the record if it exists, or [`None`] otherwise.
    pub fn find_by_id(&self, id: u64) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Select the earliest inserted record whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Record> {
        let wanted = name.to_lowercase();
        self.records
            .iter()
            .find(|record| record.name.to_lowercase() == wanted)
    }

    /// Delete a record by its id.
    ///
    /// # Returns
    ///
    /// An [`Option`] containing the deleted record if it existed, or [`None`]
    /// otherwise. A miss leaves the table untouched.
    pub fn delete_by_id(&mut self, id: u64) -> Option<Record> {
        let pos = self.records.iter().position(|record| record.id == id)?;
        let record = self.records.remove(pos);

        debug!(id, "deleted record");

        Some(record)
    }

    /// Set the score of a record by its id.
    ///
    /// Only the `score` field of the matching record changes.
    ///
    /// # Returns
    ///
    /// The updated record, or [`None`] if no record has this id.
    pub fn update_score(&mut self, id: u64, new_score: i64) -> Option<&Record> {
        let record = self.records.iter_mut().find(|record| record.id == id)?;
        let old_score = record.score;
        record.score = new_score;

        debug!(id, old_score, new_score, "updated score");

        Some(&*record)
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// The id the next insert will assign.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Record with the highest score, earliest inserted on ties.
    pub fn max_score(&self) -> Option<&Record> {
        // `max_by_key` keeps the last of equal elements, so fold by hand.
        self.records.iter().fold(None, |best, record| match best {
            Some(best) if best.score >= record.score => Some(best),
            _ => Some(record),
        })
    }

    /// Record with the lowest score, earliest inserted on ties.
    pub fn min_score(&self) -> Option<&Record> {
        self.records.iter().min_by_key(|record| record.score)
    }

    /// Mean score over all records, or [`None`] if the table is empty.
    pub fn average_score(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }

        let total: i128 = self.records.iter().map(|record| record.score as i128).sum();
        Some(total as f64 / self.records.len() as f64)
    }

    /// Write the whole table to a snapshot file, replacing any existing file.
    ///
    /// The table itself is never modified, whether or not the write succeeds.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> DbResult<()> {
        let path = path.as_ref();
        snapshot::write(path, self.next_id, &self.records)?;

        info!(
            path = %path.display(),
            records = self.records.len(),
            next_id = self.next_id,
            "saved snapshot"
        );

        Ok(())
    }

    /// Read a table back from a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a snapshot, was
    /// written by an unsupported format version, or fails integrity checks.
    /// No partially populated table is ever returned.
    pub fn load_snapshot(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let (next_id, records) = snapshot::read(path)?;
        let table = Self::from_parts(next_id, records)?;

        info!(
            path = %path.display(),
            records = table.count(),
            next_id = table.next_id,
            "loaded snapshot"
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(table: &Table) -> Vec<u64> {
        table.iter().map(|record| record.id).collect()
    }

    fn scored(scores: &[i64]) -> Table {
        let mut table = Table::new();
        for (i, score) in scores.iter().enumerate() {
            table.insert(&format!("student{}", i), "CS", *score, "Pune");
        }
        table
    }

    #[test]
    fn table_insert_and_select() {
        let mut table = Table::new();

        let id = table.insert("Alice", "CS", 70, "Pune").id;
        let record = table.find_by_id(id).expect("Record not found");

        assert_eq!(id, 1);
        assert_eq!(record.name, "Alice");
        assert_eq!(record.course, "CS");
        assert_eq!(record.score, 70);
        assert_eq!(record.city, "Pune");
        assert_eq!(table.next_id(), 2);
    }

    #[test]
    fn table_select_missing() {
        let mut table = Table::new();
        table.insert("Alice", "CS", 70, "Pune");

        assert!(table.find_by_id(2).is_none());
        assert!(table.find_by_name("Bob").is_none());
    }

    #[test]
    fn table_find_by_name_ignores_case() {
        let mut table = Table::new();
        table.insert("Alice", "CS", 70, "Pune");

        let record = table.find_by_name("aLICE").expect("Record not found");
        assert_eq!(record.id, 1);
    }

    #[test]
    fn table_find_by_name_returns_earliest() {
        let mut table = Table::new();
        table.insert("Sam", "CS", 70, "Pune");
        table.insert("sam", "IT", 80, "Mumbai");

        assert_eq!(table.find_by_name("SAM").unwrap().id, 1);

        table.delete_by_id(1);
        assert_eq!(table.find_by_name("SAM").unwrap().id, 2);
    }

    #[test]
    fn table_list_keeps_insertion_order() {
        let mut table = Table::new();
        table.insert("A", "CS", 10, "Pune");
        table.insert("B", "CS", 20, "Pune");
        table.insert("C", "CS", 30, "Pune");
        table.update_score(1, 99);
        table.delete_by_id(2);
        table.insert("D", "CS", 40, "Pune");

        let names: Vec<&str> = table
            .list_all()
            .unwrap()
            .iter()
            .map(|record| record.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C", "D"]);
    }

    #[test]
    fn table_delete() {
        let mut table = Table::new();
        let id = table.insert("Alice", "CS", 70, "Pune").id;

        let deleted = table.delete_by_id(id).expect("Record not found");
        assert_eq!(deleted.id, id);
        assert_eq!(deleted.name, "Alice");

        assert!(table.find_by_id(id).is_none());
        assert_eq!(table.count(), 0);
    }

    #[test]
    fn table_delete_missing_is_noop() {
        let mut table = Table::new();
        table.insert("A", "CS", 70, "Pune");
        table.insert("B", "CS", 85, "Mumbai");
        let before = table.clone();

        assert!(table.delete_by_id(42).is_none());
        assert_eq!(table, before);
        assert_eq!(table.count(), 2);
    }

    #[test]
    fn table_update_score_only_touches_score() {
        let mut table = Table::new();
        table.insert("A", "CS", 70, "Pune");
        table.insert("B", "IT", 85, "Mumbai");
        let untouched = table.find_by_id(1).unwrap().clone();

        let updated = table.update_score(2, 91).expect("Record not found");
        assert_eq!(updated.score, 91);

        let record = table.find_by_id(2).unwrap();
        assert_eq!(record.name, "B");
        assert_eq!(record.course, "IT");
        assert_eq!(record.city, "Mumbai");
        assert_eq!(table.find_by_id(1), Some(&untouched));
    }

    #[test]
    fn table_update_missing_is_noop() {
        let mut table = scored(&[70, 85]);
        let before = table.clone();

        assert!(table.update_score(9, 1).is_none());
        assert_eq!(table, before);
    }

    #[test]
    fn table_aggregates() {
        let table = scored(&[70, 85, 85, 40]);

        let max = table.max_score().unwrap();
        assert_eq!(max.score, 85);
        assert_eq!(max.id, 2);

        let min = table.min_score().unwrap();
        assert_eq!(min.score, 40);
        assert_eq!(min.id, 4);

        assert_eq!(table.average_score(), Some(70.0));
        assert_eq!(table.count(), 4);
    }

    #[test]
    fn table_min_ties_pick_earliest() {
        let table = scored(&[50, 30, 30, 90]);

        assert_eq!(table.min_score().unwrap().id, 2);
    }

    #[test]
    fn table_average_is_fractional() {
        let table = scored(&[1, 2]);

        assert_eq!(table.average_score(), Some(1.5));
    }

    #[test]
    fn table_empty_signals() {
        let table = Table::new();

        assert!(table.list_all().is_none());
        assert!(table.max_score().is_none());
        assert!(table.min_score().is_none());
        assert!(table.average_score().is_none());
        assert_eq!(table.count(), 0);
        assert_eq!(table.next_id(), 1);
    }

    #[test]
    fn table_ids_not_reused() {
        let mut table = Table::new();
        table.insert("A", "CS", 70, "Pune");
        table.insert("B", "CS", 85, "Mumbai");
        table.delete_by_id(1);
        table.insert("C", "IT", 90, "Pune");

        assert_eq!(ids(&table), vec![2, 3]);
        assert_eq!(table.next_id(), 4);
        assert_eq!(table.count(), 2);

        // Deleting the newest record does not roll the counter back.
        table.delete_by_id(3);
        assert_eq!(table.insert("D", "IT", 60, "Pune").id, 4);
    }

    #[test]
    fn table_from_parts_rejects_bad_ids() {
        let record = |id| Record::new(id, "A", "CS", 1, "Pune");

        assert!(Table::from_parts(0, vec![]).is_err());
        assert!(Table::from_parts(3, vec![record(2), record(1)]).is_err());
        assert!(Table::from_parts(3, vec![record(1), record(1)]).is_err());
        assert!(Table::from_parts(2, vec![record(1), record(2)]).is_err());
        assert!(matches!(
            Table::from_parts(u64::MAX, vec![]),
            Err(StudentBaseError::Corrupt(_))
        ));

        assert!(Table::from_parts(u64::MAX - 1, vec![record(7)]).is_ok());

        let table = Table::from_parts(10, vec![record(2), record(5)]).unwrap();
        assert_eq!(ids(&table), vec![2, 5]);
        assert_eq!(table.next_id(), 10);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(i64),
            Delete(u64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                any::<i64>().prop_map(Op::Insert),
                (0u64..40).prop_map(Op::Delete),
            ]
        }

        proptest! {
            #[test]
            fn new_ids_exceed_every_previous_id(ops in prop::collection::vec(op(), 0..60)) {
                let mut table = Table::new();
                let mut highest = 0;

                for op in ops {
                    match op {
                        Op::Insert(score) => {
                            let id = table.insert("x", "y", score, "z").id;
                            prop_assert!(id > highest);
                            highest = id;
                        }
                        Op::Delete(id) => {
                            table.delete_by_id(id);
                        }
                    }

                    prop_assert_eq!(table.next_id(), highest + 1);
                    let current = ids(&table);
                    prop_assert!(current.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }
    }
}
