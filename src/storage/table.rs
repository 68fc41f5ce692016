use bincode::{Decode, Encode};

use super::{COLUMN_DELIMITER, condition::Condition, error::TableError, row::Row};

/// Name of the synthetic key column present in every table.
pub(crate) const ID_COLUMN: &str = "id";

/// An ordered schema plus an ordered sequence of rows.
///
/// All operations here are in-memory; loading and persisting a table is the
/// engine's responsibility. The `next_id` counter is persisted alongside the
/// rows so automatically assigned ids stay unique across deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
    next_id: u64,
}

impl Table {
    /// Creates an empty table with the reserved `id` column followed by
    /// `columns`.
    pub fn new(columns: &[String]) -> Result<Self, TableError> {
        let mut table = Self::default();
        table.add_column(ID_COLUMN)?;
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a column to the schema and, with an empty value, to every
    /// existing row.
    pub fn add_column(&mut self, name: &str) -> Result<(), TableError> {
        if self.columns.iter().any(|column| column == name) {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.add_column(name)?;
        }
        Ok(())
    }

    /// Removes a column from the schema and from every row. The reserved
    /// `id` column cannot be removed.
    pub fn remove_column(&mut self, name: &str) -> Result<(), TableError> {
        if name == ID_COLUMN {
            return Err(TableError::ReservedColumn(name.to_string()));
        }
        let position = self
            .columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        self.columns.remove(position);
        for row in &mut self.rows {
            row.remove_column(name)?;
        }
        Ok(())
    }

    /// Appends a row. The `id` column is assigned automatically; values map
    /// onto the remaining columns in order, missing trailing values default
    /// to the empty string.
    pub fn add_row(&mut self, values: &[String]) -> Result<(), TableError> {
        let slots = self.columns.len().saturating_sub(1);
        if values.len() > slots {
            return Err(TableError::ExcessValues {
                given: values.len(),
                expected: slots,
            });
        }

        let mut row = Row::new();
        for column in &self.columns {
            row.add_column(column)?;
        }
        row.set(ID_COLUMN, &self.next_id.to_string())?;
        for (column, value) in self.columns.iter().skip(1).zip(values) {
            row.set(column, value)?;
        }

        self.rows.push(row);
        self.next_id += 1;
        Ok(())
    }

    /// Renders the schema as a single header line.
    pub fn header(&self) -> String {
        self.columns.join(COLUMN_DELIMITER)
    }

    /// Renders the schema narrowed to `columns`, in schema order.
    pub fn projected_header(&self, columns: &[String]) -> Result<String, TableError> {
        self.ensure_columns(columns)?;
        Ok(self
            .columns
            .iter()
            .filter(|column| columns.iter().any(|c| c == *column))
            .cloned()
            .collect::<Vec<String>>()
            .join(COLUMN_DELIMITER))
    }

    /// Renders every row, one line per row, in insertion order.
    pub fn all_rows(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.project(None))
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Renders the rows satisfying `condition`, same format as
    /// [`Table::all_rows`].
    pub fn matching_rows(&self, condition: &Condition) -> Result<String, TableError> {
        let mut lines = Vec::new();
        for row in &self.rows {
            if condition.matches(row)? {
                lines.push(row.project(None));
            }
        }
        Ok(lines.join("\n"))
    }

    /// Renders the rows satisfying `condition` (all rows when absent),
    /// narrowed to `columns`.
    pub fn projected_rows(
        &self,
        condition: Option<&Condition>,
        columns: &[String],
    ) -> Result<String, TableError> {
        self.ensure_columns(columns)?;
        let mut lines = Vec::new();
        for row in &self.rows {
            if self.included(row, condition)? {
                lines.push(row.project(Some(columns)));
            }
        }
        Ok(lines.join("\n"))
    }

    /// Sets `column` to `value` on every row satisfying `condition` (every
    /// row when absent). Matching zero rows is not an error.
    pub fn update_matching(
        &mut self,
        condition: Option<&Condition>,
        column: &str,
        value: &str,
    ) -> Result<(), TableError> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(TableError::UnknownColumn(column.to_string()));
        }
        let matched = self.match_rows(condition)?;
        for (row, matched) in self.rows.iter_mut().zip(matched) {
            if matched {
                row.set(column, value)?;
            }
        }
        Ok(())
    }

    /// Removes every row satisfying `condition` (every row when absent),
    /// preserving the relative order of survivors. Matching zero rows is not
    /// an error.
    pub fn delete_matching(&mut self, condition: Option<&Condition>) -> Result<(), TableError> {
        let matched = self.match_rows(condition)?;
        let mut matched = matched.into_iter();
        self.rows.retain(|_| !matched.next().unwrap_or(false));
        Ok(())
    }

    /// Evaluates `condition` against every row up front, so a faulty
    /// predicate fails before any mutation.
    fn match_rows(&self, condition: Option<&Condition>) -> Result<Vec<bool>, TableError> {
        let mut matched = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            matched.push(self.included(row, condition)?);
        }
        Ok(matched)
    }

    fn included(&self, row: &Row, condition: Option<&Condition>) -> Result<bool, TableError> {
        match condition {
            Some(condition) => condition.matches(row),
            None => Ok(true),
        }
    }

    fn ensure_columns(&self, columns: &[String]) -> Result<(), TableError> {
        for column in columns {
            if !self.columns.iter().any(|c| c == column) {
                return Err(TableError::UnknownColumn(column.clone()));
            }
        }
        Ok(())
    }
}
