use crate::Schema;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The bare SQL literal, unquoted even for text.
    /// Quoting belongs to the caller, which knows the declared column type.
    pub fn literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}
impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Named columns crossed with rows of [`Value`]s.
///
/// The staging shape on the way into the database and the result shape
/// on the way out.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. Arity must match the column set.
    pub fn push(&mut self, row: Vec<Value>) {
        assert_eq!(self.columns.len(), row.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let at = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(at)
    }

    /// Serializes a row range into a literal SQL value-list string.
    ///
    /// Columns walk in `order` when given, else in the schema's mapping
    /// order. A column the frame does not carry serializes as `NULL`, as
    /// does a [`Value::Null`] cell. Cells under a textual declared type
    /// are single-quoted with any embedded single quotes stripped, not
    /// escaped; everything else is the bare literal. Rows become `(v,…)`
    /// tuples joined by commas.
    pub fn values(
        &self,
        rows: std::ops::Range<usize>,
        schema: &Schema,
        order: Option<&[String]>,
    ) -> String {
        let order = match order {
            Some(order) => order.iter().map(String::as_str).collect::<Vec<_>>(),
            None => schema.names().collect::<Vec<_>>(),
        };
        let end = rows.end.min(self.rows.len());
        let start = rows.start.min(end);
        self.rows[start..end]
            .iter()
            .map(|row| {
                let cells = order
                    .iter()
                    .map(|&name| {
                        let cell = self
                            .columns
                            .iter()
                            .position(|c| c == name)
                            .map(|at| &row[at]);
                        match cell {
                            None => "NULL".to_string(),
                            Some(Value::Null) => "NULL".to_string(),
                            Some(value) if schema.textual(name) => {
                                format!("'{}'", value.literal().replace('\'', ""))
                            }
                            Some(value) => value.literal(),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({})", cells)
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let widths = self
            .columns
            .iter()
            .enumerate()
            .map(|(at, name)| {
                self.rows
                    .iter()
                    .map(|row| row[at].literal().len())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect::<Vec<_>>();
        let rule = |left: char, mid: char, right: char| {
            let mut line = String::new();
            line.push(left);
            for (at, width) in widths.iter().enumerate() {
                line.push_str(&"─".repeat(width + 2));
                line.push(if at + 1 == widths.len() { right } else { mid });
            }
            line
        };
        writeln!(f, "{}", rule('┌', '┬', '┐'))?;
        let mut header = String::from("│");
        for (at, name) in self.columns.iter().enumerate() {
            header.push_str(&format!(" {:<width$} │", name, width = widths[at]));
        }
        writeln!(f, "{}", header)?;
        writeln!(f, "{}", rule('├', '┼', '┤'))?;
        for row in &self.rows {
            let mut line = String::from("│");
            for (at, cell) in row.iter().enumerate() {
                line.push_str(&format!(" {:<width$} │", cell.literal(), width = widths[at]));
            }
            writeln!(f, "{}", line)?;
        }
        write!(f, "{}", rule('└', '┴', '┘'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqlType;

    fn schema() -> Schema {
        Schema::new()
            .column("a", SqlType::Text)
            .column("b", SqlType::Int)
    }

    #[test]
    fn embedded_quotes_are_stripped_not_escaped() {
        let mut frame = Frame::new(vec!["a".into(), "b".into()]);
        frame.push(vec![Value::from("O'Brien"), Value::from(5i64)]);
        assert_eq!(frame.values(0..1, &schema(), None), "('OBrien',5)");
    }

    #[test]
    fn absent_column_serializes_null() {
        let mut frame = Frame::new(vec!["a".into()]);
        frame.push(vec![Value::from("x")]);
        let order = vec!["a".to_string(), "b".to_string()];
        assert_eq!(frame.values(0..1, &schema(), Some(&order)), "('x',NULL)");
    }

    #[test]
    fn null_cell_is_never_quoted() {
        let mut frame = Frame::new(vec!["a".into(), "b".into()]);
        frame.push(vec![Value::Null, Value::from(1i64)]);
        assert_eq!(frame.values(0..1, &schema(), None), "(NULL,1)");
    }

    #[test]
    fn declared_type_decides_quoting() {
        let mut frame = Frame::new(vec!["a".into(), "b".into()]);
        frame.push(vec![Value::from(5i64), Value::from("7")]);
        assert_eq!(frame.values(0..1, &schema(), None), "('5',7)");
    }

    #[test]
    fn rows_join_as_tuples() {
        let mut frame = Frame::new(vec!["a".into(), "b".into()]);
        frame.push(vec![Value::from("x"), Value::from(1i64)]);
        frame.push(vec![Value::from("y"), Value::from(2i64)]);
        assert_eq!(frame.values(0..2, &schema(), None), "('x',1),('y',2)");
    }

    #[test]
    fn range_clamps_to_row_count() {
        let mut frame = Frame::new(vec!["a".into(), "b".into()]);
        frame.push(vec![Value::from("x"), Value::from(1i64)]);
        assert_eq!(frame.values(0..500, &schema(), None), "('x',1)");
    }

    #[test]
    fn value_lookup_by_name() {
        let mut frame = Frame::new(vec!["a".into(), "b".into()]);
        frame.push(vec![Value::from("x"), Value::from(1i64)]);
        assert_eq!(frame.value(0, "b"), Some(&Value::Int(1)));
        assert_eq!(frame.value(0, "z"), None);
        assert_eq!(frame.value(9, "a"), None);
    }
}
