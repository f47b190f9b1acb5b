//! Interactive menu driving an [`Archive`] over line-based input

use std::io::{BufRead, Write};

use crate::{
    archive::{Archive, TomeField},
    error::{AppError, AppResult},
    models::Tome,
};

const MENU: &str = "\n=== City Library Digital Management System ===
1) Add Book
2) Add Member
3) Issue Book
4) Return Book
5) Search Books
6) Sort Books
7) View Categories
8) Save & Exit";

/// What the loop should do after a command
enum Flow {
    Continue,
    Exit,
}

pub struct Console<'a, R, W> {
    archive: &'a mut Archive,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(archive: &'a mut Archive, input: R, output: W) -> Self {
        Self { archive, input, output }
    }

    /// Run until Save & Exit or end of input; both save the archive.
    ///
    /// Only failures writing to the output end the loop early.
    pub fn run(&mut self) -> AppResult<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            let Some(choice) = self.prompt("Enter choice: ")? else {
                tracing::info!("End of input, saving and exiting");
                self.archive.save_all();
                return Ok(());
            };

            match self.dispatch(&choice) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(AppError::Io(e)) => return Err(AppError::Io(e)),
                Err(AppError::BadRequest(_)) => writeln!(self.output, "Invalid number format.")?,
                Err(e @ (AppError::Validation(_) | AppError::NotFound(_))) => {
                    writeln!(self.output, "Input error: {}", e.message())?
                }
                Err(e @ AppError::IdsExhausted(_)) => {
                    writeln!(self.output, "Unexpected error: {}", e.message())?
                }
            }
        }
    }

    fn dispatch(&mut self, choice: &str) -> AppResult<Flow> {
        match choice {
            "1" => {
                let title = self.read_line("Title: ")?;
                let author = self.read_line("Author: ")?;
                let category = self.read_line("Category: ")?;
                let id = self.archive.add_book(&title, &author, Some(&category))?;
                writeln!(self.output, "Book added successfully with ID: {}", id)?;
            }
            "2" => {
                let name = self.read_line("Member Name: ")?;
                let email = self.read_line("Email: ")?;
                let id = self.archive.add_member(&name, &email)?;
                writeln!(self.output, "Member added successfully with ID: {}", id)?;
            }
            "3" => {
                let book_id = self.read_id("Book ID to issue: ")?;
                let member_id = self.read_id("Member ID: ")?;
                let message = if self.archive.issue_book(book_id, member_id)? {
                    "Book issued."
                } else {
                    "Book is already issued."
                };
                writeln!(self.output, "{}", message)?;
            }
            "4" => {
                let book_id = self.read_id("Book ID to return: ")?;
                let member_id = self.read_id("Member ID: ")?;
                let message = if self.archive.return_book(book_id, member_id)? {
                    "Book returned."
                } else {
                    "This member did not have that book."
                };
                writeln!(self.output, "{}", message)?;
            }
            "5" => {
                writeln!(self.output, "Search by: 1) Title 2) Author 3) Category")?;
                let field = match self.read_line("")?.as_str() {
                    "1" => TomeField::Title,
                    "2" => TomeField::Author,
                    _ => TomeField::Category,
                };
                let fragment = self.read_line("Enter search text: ")?;
                let results = self.archive.search_books(field, &fragment);
                if results.is_empty() {
                    writeln!(self.output, "No books found.")?;
                } else {
                    self.print_tomes(&results)?;
                }
            }
            "6" => {
                writeln!(self.output, "Sort by: 1) Title 2) Author 3) Category")?;
                let field = match self.read_line("")?.as_str() {
                    "2" => TomeField::Author,
                    "3" => TomeField::Category,
                    _ => TomeField::Title,
                };
                let sorted = self.archive.sort_books(field);
                self.print_tomes(&sorted)?;
            }
            "7" => {
                writeln!(self.output, "Categories:")?;
                for category in self.archive.categories() {
                    writeln!(self.output, "{}", category)?;
                }
            }
            "8" => {
                self.archive.save_all();
                writeln!(self.output, "Saved. Exiting.")?;
                return Ok(Flow::Exit);
            }
            _ => writeln!(self.output, "Invalid option.")?,
        }
        Ok(Flow::Continue)
    }

    fn print_tomes(&mut self, tomes: &[Tome]) -> AppResult<()> {
        for tome in tomes {
            writeln!(self.output, "{}", tome)?;
        }
        Ok(())
    }

    /// Print `label` and read one trimmed line; None at end of input.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    fn prompt(&mut self, label: &str) -> AppResult<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }

    /// Like `prompt`, but running out of input mid-command reads as an empty line
    fn read_line(&mut self, label: &str) -> AppResult<String> {
        Ok(self.prompt(label)?.unwrap_or_default())
    }

    fn read_id(&mut self, label: &str) -> AppResult<i32> {
        let text = self.read_line(label)?;
        text.parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid number: {:?}", text)))
    }
}
