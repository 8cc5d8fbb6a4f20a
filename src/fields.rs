use crate::Error;

/// Column list for an insert or update statement.
///
/// Either an explicit set of column names or a raw fragment passed
/// through untouched, so callers can hand over prebuilt SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fields {
    Columns(Vec<String>),
    Raw(String),
}

impl Fields {
    /// Renders the column-list fragment.
    ///
    /// Explicit columns come out parenthesized and comma-joined, quoted
    /// in single quotes when asked. Raw fragments come out verbatim.
    pub fn sql(&self, quoted: bool) -> String {
        match self {
            Fields::Raw(raw) => raw.clone(),
            Fields::Columns(names) => {
                let names = names
                    .iter()
                    .map(|name| match quoted {
                        true => format!("'{}'", name),
                        false => name.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({})", names)
            }
        }
    }
}

impl From<Vec<String>> for Fields {
    fn from(names: Vec<String>) -> Self {
        Fields::Columns(names)
    }
}

impl From<&[&str]> for Fields {
    fn from(names: &[&str]) -> Self {
        Fields::Columns(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<&str> for Fields {
    fn from(raw: &str) -> Self {
        Fields::Raw(raw.to_string())
    }
}

impl TryFrom<&serde_json::Value> for Fields {
    type Error = Error;
    fn try_from(value: &serde_json::Value) -> Result<Self, Error> {
        match value {
            serde_json::Value::String(raw) => Ok(Fields::Raw(raw.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(name) => Ok(name.clone()),
                    other => Err(Error::FieldShape(other.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Fields::Columns),
            other => Err(Error::FieldShape(other.to_string())),
        }
    }
}
