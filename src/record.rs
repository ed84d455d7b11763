use std::fmt;

use serde::{Deserialize, Serialize};

/// A single student row in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique id, assigned by [`crate::Table::insert`].
    pub id: u64,
    pub name: String,
    pub course: String,
    /// Marks obtained.
    pub score: i64,
    pub city: String,
}

impl Record {
    pub(crate) fn new(id: u64, name: &str, course: &str, score: i64, city: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
            course: course.to_owned(),
            score,
            city: city.to_owned(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Name: {} | Course: {} | Marks: {} | City: {}",
            self.id, self.name, self.course, self.score, self.city
        )
    }
}
