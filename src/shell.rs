//! Numbered-menu console over a [`Table`].
//!
//! Each iteration reads one selection, collects the fields that operation
//! needs, calls exactly one table operation and prints the outcome. The shell
//! is generic over its streams so it can be scripted.

use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};

use crate::config::Config;
use crate::table::Table;

const RULE: &str = "----------------------------------------------------------";

/// Menu entries, numbered as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Insert,
    ListAll,
    Backup,
    FindById,
    FindByName,
    Delete,
    Count,
    MaxScore,
    MinScore,
    AverageScore,
    UpdateScore,
    Exit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 12] = [
        MenuOption::Insert,
        MenuOption::ListAll,
        MenuOption::Backup,
        MenuOption::FindById,
        MenuOption::FindByName,
        MenuOption::Delete,
        MenuOption::Count,
        MenuOption::MaxScore,
        MenuOption::MinScore,
        MenuOption::AverageScore,
        MenuOption::UpdateScore,
        MenuOption::Exit,
    ];

    pub fn number(self) -> i64 {
        match self {
            MenuOption::Insert => 1,
            MenuOption::ListAll => 2,
            MenuOption::Backup => 3,
            MenuOption::FindById => 4,
            MenuOption::FindByName => 5,
            MenuOption::Delete => 6,
            MenuOption::Count => 7,
            MenuOption::MaxScore => 8,
            MenuOption::MinScore => 9,
            MenuOption::AverageScore => 10,
            MenuOption::UpdateScore => 11,
            MenuOption::Exit => 20,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuOption::Insert => "Insert into student table",
            MenuOption::ListAll => "Display all records",
            MenuOption::Backup => "Take backup",
            MenuOption::FindById => "Search by Student ID",
            MenuOption::FindByName => "Search by Student Name",
            MenuOption::Delete => "Delete by Student ID",
            MenuOption::Count => "Count total students",
            MenuOption::MaxScore => "Display highest marks",
            MenuOption::MinScore => "Display lowest marks",
            MenuOption::AverageScore => "Display average marks",
            MenuOption::UpdateScore => "Update marks",
            MenuOption::Exit => "Exit the DBMS",
        }
    }

    pub fn from_number(number: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.number() == number)
    }
}

pub struct Shell<R, W> {
    table: Table,
    snapshot_path: PathBuf,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Start a shell, restoring the configured snapshot if possible.
    ///
    /// A missing or unreadable snapshot is not an error: the shell starts
    /// with an empty table and says so.
    pub fn open(config: &Config, input: R, mut output: W) -> io::Result<Self> {
        let table = match Table::load_snapshot(&config.snapshot_path) {
            Ok(table) => table,
            Err(err) => {
                warn!(
                    path = %config.snapshot_path.display(),
                    %err,
                    "could not restore snapshot, starting empty"
                );
                writeln!(output, "Unable to restore backup. Starting new DBMS...")?;
                Table::new()
            }
        };

        Ok(Self::with_table(table, &config.snapshot_path, input, output))
    }

    pub fn with_table(table: Table, snapshot_path: &Path, input: R, output: W) -> Self {
        Self {
            table,
            snapshot_path: snapshot_path.to_owned(),
            input,
            output,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Run until the exit option is chosen or input ends.
    ///
    /// Both ways out write the snapshot first.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", RULE)?;
        writeln!(self.output, "------------------------ Student DBMS --------------------")?;
        writeln!(self.output, "{}", RULE)?;

        loop {
            self.print_menu()?;

            let Some(choice) = self.prompt_number::<i64>("Enter your choice: ")? else {
                self.exit()?;
                break;
            };

            match MenuOption::from_number(choice) {
                Some(option) => {
                    if self.dispatch(option)?.is_break() {
                        break;
                    }
                }
                None => writeln!(self.output, "Invalid option. Please try again.")?,
            }
        }

        Ok(())
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Choose an operation:")?;
        for option in MenuOption::ALL {
            writeln!(self.output, "{:<2} : {}", option.number(), option.label())?;
        }
        Ok(())
    }

    fn dispatch(&mut self, option: MenuOption) -> io::Result<ControlFlow<()>> {
        match option {
            MenuOption::Insert => self.insert(),
            MenuOption::ListAll => self.list_all().map(ControlFlow::Continue),
            MenuOption::Backup => self.backup().map(ControlFlow::Continue),
            MenuOption::FindById => self.find_by_id(),
            MenuOption::FindByName => self.find_by_name(),
            MenuOption::Delete => self.delete(),
            MenuOption::Count => {
                writeln!(self.output, "Total Students: {}", self.table.count())?;
                Ok(ControlFlow::Continue(()))
            }
            MenuOption::MaxScore => {
                match self.table.max_score() {
                    Some(record) => {
                        writeln!(self.output, "Highest Marks: {}", record.score)?;
                        writeln!(self.output, "Student: {}", record.name)?;
                    }
                    None => writeln!(self.output, "No records available.")?,
                }
                Ok(ControlFlow::Continue(()))
            }
            MenuOption::MinScore => {
                match self.table.min_score() {
                    Some(record) => {
                        writeln!(self.output, "Lowest Marks: {}", record.score)?;
                        writeln!(self.output, "Student: {}", record.name)?;
                    }
                    None => writeln!(self.output, "No records available.")?,
                }
                Ok(ControlFlow::Continue(()))
            }
            MenuOption::AverageScore => {
                match self.table.average_score() {
                    Some(average) => writeln!(self.output, "Class Average Marks: {:?}", average)?,
                    None => writeln!(self.output, "No records available.")?,
                }
                Ok(ControlFlow::Continue(()))
            }
            MenuOption::UpdateScore => self.update_score(),
            MenuOption::Exit => self.exit(),
        }
    }

    fn insert(&mut self) -> io::Result<ControlFlow<()>> {
        let Some(name) = self.prompt_text("Enter Student Name: ")? else {
            return self.exit();
        };
        let Some(course) = self.prompt_text("Enter Course: ")? else {
            return self.exit();
        };
        let Some(score) = self.prompt_number::<i64>("Enter Marks: ")? else {
            return self.exit();
        };
        let Some(city) = self.prompt_text("Enter City: ")? else {
            return self.exit();
        };

        let id = self.table.insert(&name, &course, score, &city).id;
        writeln!(self.output, "New Record Inserted Successfully (ID: {})", id)?;
        Ok(ControlFlow::Continue(()))
    }

    fn list_all(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", RULE)?;
        writeln!(self.output, "Data from the student table")?;
        writeln!(self.output, "{}", RULE)?;

        match self.table.list_all() {
            Some(records) => {
                for record in records {
                    writeln!(self.output, "{}", record)?;
                }
            }
            None => writeln!(self.output, "No records found.")?,
        }

        writeln!(self.output, "{}", RULE)
    }

    fn find_by_id(&mut self) -> io::Result<ControlFlow<()>> {
        let Some(id) = self.prompt_number::<i64>("Enter Student ID: ")? else {
            return self.exit();
        };

        match stored_id(id).and_then(|id| self.table.find_by_id(id)) {
            Some(record) => writeln!(self.output, "{}", record)?,
            None => writeln!(self.output, "Record not found.")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn find_by_name(&mut self) -> io::Result<ControlFlow<()>> {
        let Some(name) = self.prompt_text("Enter Student Name: ")? else {
            return self.exit();
        };

        match self.table.find_by_name(&name) {
            Some(record) => writeln!(self.output, "{}", record)?,
            None => writeln!(self.output, "Record not found.")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn delete(&mut self) -> io::Result<ControlFlow<()>> {
        let Some(id) = self.prompt_number::<i64>("Enter Student ID to delete: ")? else {
            return self.exit();
        };

        match stored_id(id).and_then(|id| self.table.delete_by_id(id)) {
            Some(_) => writeln!(self.output, "Record deleted successfully.")?,
            None => writeln!(self.output, "Record not found.")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn update_score(&mut self) -> io::Result<ControlFlow<()>> {
        let Some(id) = self.prompt_number::<i64>("Enter Student ID to update marks: ")? else {
            return self.exit();
        };
        let Some(score) = self.prompt_number::<i64>("Enter new marks: ")? else {
            return self.exit();
        };

        match stored_id(id).and_then(|id| self.table.update_score(id, score)) {
            Some(_) => writeln!(self.output, "Marks updated successfully for ID: {}", id)?,
            None => writeln!(self.output, "Record not found.")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn backup(&mut self) -> io::Result<()> {
        match self.table.save_snapshot(&self.snapshot_path) {
            Ok(()) => writeln!(self.output, "Backup created successfully."),
            Err(err) => {
                warn!(path = %self.snapshot_path.display(), %err, "backup failed");
                writeln!(self.output, "Exception occurred while taking backup.")
            }
        }
    }

    fn exit(&mut self) -> io::Result<ControlFlow<()>> {
        writeln!(self.output, "Thank you for using Student DBMS!")?;
        self.backup()?;
        info!(records = self.table.count(), "shell exiting");
        Ok(ControlFlow::Break(()))
    }

    /// Read one line without its line ending. `None` at end of input.
    ///
    /// A line that is not valid UTF-8 comes back as `Some(Err(bytes))` so the
    /// caller can ask again instead of failing the session.
    fn read_line(&mut self) -> io::Result<Option<Result<String, Vec<u8>>>> {
        let mut bytes = Vec::new();
        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }

        while matches!(bytes.last(), Some(b'\n' | b'\r')) {
            bytes.pop();
        }
        Ok(Some(String::from_utf8(bytes).map_err(|err| err.into_bytes())))
    }

    /// Prompt until a line of valid text arrives. `None` at end of input.
    fn prompt_text(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            match self.read_line()? {
                Some(Ok(line)) => return Ok(Some(line)),
                Some(Err(bytes)) => {
                    warn!(len = bytes.len(), "rejected input that is not valid UTF-8");
                    writeln!(self.output, "Input is not valid text. Please try again.")?;
                }
                None => return Ok(None),
            }
        }
    }

    /// Prompt until the input parses as a number. `None` at end of input.
    fn prompt_number<T: FromStr>(&mut self, prompt: &str) -> io::Result<Option<T>> {
        loop {
            let Some(line) = self.prompt_text(prompt)? else {
                return Ok(None);
            };

            match line.trim().parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "Please enter a valid number.")?,
            }
        }
    }
}

/// Ids are assigned from 1 upwards, so a negative id can never match.
fn stored_id(id: i64) -> Option<u64> {
    u64::try_from(id).ok()
}
