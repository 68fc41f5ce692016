use bincode::{Decode, Encode};

use super::{COLUMN_DELIMITER, error::TableError};

/// One record: an ordered mapping from column name to textual value.
///
/// Columns keep their insertion order; values default to the empty string
/// until explicitly set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct Row {
    entries: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column with an empty value.
    pub fn add_column(&mut self, name: &str) -> Result<(), TableError> {
        if self.entries.iter().any(|(column, _)| column == name) {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        self.entries.push((name.to_string(), String::new()));
        Ok(())
    }

    pub fn get(&self, column: &str) -> Result<&str, TableError> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))
    }

    pub fn set(&mut self, column: &str, value: &str) -> Result<(), TableError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|(name, _)| name == column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;
        entry.1 = value.to_string();
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Result<(), TableError> {
        let position = self
            .entries
            .iter()
            .position(|(column, _)| column == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        self.entries.remove(position);
        Ok(())
    }

    /// Renders the row's values, delimiter separated. `columns` narrows the
    /// output to a subset; the subset keeps the row's own column order, not
    /// the caller's.
    pub fn project(&self, columns: Option<&[String]>) -> String {
        self.entries
            .iter()
            .filter(|(column, _)| {
                columns.map_or(true, |wanted| wanted.iter().any(|w| w == column))
            })
            .map(|(_, value)| value.as_str())
            .collect::<Vec<&str>>()
            .join(COLUMN_DELIMITER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        let mut row = Row::new();
        row.add_column("id").unwrap();
        row.add_column("name").unwrap();
        row.add_column("age").unwrap();
        row.set("id", "0").unwrap();
        row.set("name", "alice").unwrap();
        row.set("age", "30").unwrap();
        row
    }

    #[test]
    fn new_column_starts_empty() {
        let mut row = Row::new();
        row.add_column("name").unwrap();
        assert_eq!(row.get("name").unwrap(), "");
    }

    #[test]
    fn duplicate_column_rejected() {
        let mut row = Row::new();
        row.add_column("name").unwrap();
        assert_eq!(
            row.add_column("name"),
            Err(TableError::DuplicateColumn("name".to_string()))
        );
    }

    #[test]
    fn set_then_get() {
        let row = row();
        assert_eq!(row.get("name").unwrap(), "alice");
        assert_eq!(row.get("age").unwrap(), "30");
    }

    #[test]
    fn unknown_column_errors() {
        let mut row = row();
        assert!(row.get("email").is_err());
        assert!(row.set("email", "a@b.c").is_err());
        assert!(row.remove_column("email").is_err());
    }

    #[test]
    fn remove_column_drops_value() {
        let mut row = row();
        row.remove_column("age").unwrap();
        assert!(row.get("age").is_err());
        assert_eq!(row.project(None), "0\talice");
    }

    #[test]
    fn project_all_in_insertion_order() {
        assert_eq!(row().project(None), "0\talice\t30");
    }

    #[test]
    fn project_subset_keeps_row_order() {
        let row = row();
        let wanted = vec!["age".to_string(), "name".to_string()];
        // The row's own column order wins over the requested order.
        assert_eq!(row.project(Some(&wanted)), "alice\t30");
    }
}
