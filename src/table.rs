/// A header row plus string data rows, as read from a delimited file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Drops every column past `width` from the header and each row.
    pub fn truncate_columns(&mut self, width: usize) {
        self.headers.truncate(width);
        for row in &mut self.rows {
            row.truncate(width);
        }
    }
}
