/// Declared SQL column types.
///
/// The declared type, not the runtime [`Value`](crate::Value) variant,
/// decides whether a cell is quoted on the way into a value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Varchar,
    Int,
    BigInt,
    Float,
    Bool,
}

impl SqlType {
    /// Textual types take quoted literals; everything else goes in raw.
    pub fn is_textual(self) -> bool {
        matches!(self, SqlType::Text | SqlType::Varchar)
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SqlType::Text => "TEXT",
            SqlType::Varchar => "VARCHAR",
            SqlType::Int => "INT",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Bool => "BOOLEAN",
        })
    }
}

/// Column-to-type mapping plus primary-key and not-null designations.
///
/// Columns keep their insertion order; [`Schema::ddl`] reorders emission
/// as the constraint layout requires.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<(String, SqlType)>,
    primary: Option<String>,
    required: Vec<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column. Redeclaring a name overwrites its type in place.
    pub fn column(mut self, name: impl Into<String>, kind: SqlType) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, k)) => *k = kind,
            None => self.columns.push((name, kind)),
        }
        self
    }

    /// Designates the primary-key column.
    pub fn primary(mut self, name: impl Into<String>) -> Self {
        self.primary = Some(name.into());
        self
    }

    /// Designates a not-null column.
    pub fn not_null(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Column names in mapping order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Declared type of a column, if it has one.
    pub fn kind(&self, name: &str) -> Option<SqlType> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, k)| *k)
    }

    /// Whether a column's declared type takes quoted literals.
    /// Undeclared names do not.
    pub fn textual(&self, name: &str) -> bool {
        self.kind(name).map(SqlType::is_textual).unwrap_or(false)
    }

    /// The parenthesized column-definition fragment for `CREATE TABLE`.
    ///
    /// Emission order: the primary key first, annotated `PRIMARY KEY` and
    /// `NOT NULL` when also designated not-null, then the remaining
    /// not-null columns in designation order, then every other column in
    /// mapping order. Comma-separated, no trailing comma. Designations
    /// naming columns without a declared type are ignored.
    pub fn ddl(&self) -> String {
        let mut sequence: Vec<&str> = Vec::new();
        if let Some(primary) = self.primary.as_deref() {
            if self.kind(primary).is_some() {
                sequence.push(primary);
            }
        }
        for name in &self.required {
            if self.kind(name).is_some() && !sequence.contains(&name.as_str()) {
                sequence.push(name);
            }
        }
        for (name, _) in &self.columns {
            if !sequence.contains(&name.as_str()) {
                sequence.push(name);
            }
        }
        let columns = sequence
            .iter()
            .map(|&name| {
                let mut column = format!("{} {}", name, self.kind(name).expect("declared type"));
                if self.primary.as_deref() == Some(name) {
                    column.push_str(" PRIMARY KEY");
                }
                if self.required.iter().any(|r| r == name) {
                    column.push_str(" NOT NULL");
                }
                column
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("({})", columns)
    }
}
