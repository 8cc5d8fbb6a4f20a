//! Ingest Binary
//!
//! Loads a comma-delimited file into a PostgreSQL table and reads a
//! row count back.
//!
//! Options: --recreate, --user, --password, --host, --port, --dbname

use anyhow::Context;
use clap::Parser;
use granary::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma-delimited input file with a leading header row.
    input: PathBuf,
    /// Destination table.
    table: String,
    /// Drop and rebuild the table if it already exists.
    #[arg(long)]
    recreate: bool,
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    dbname: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    granary::log();
    let args = Args::parse();
    let file = std::fs::File::open(&args.input)
        .with_context(|| format!("open {}", args.input.display()))?;
    let (schema, frame) = table(file)?;
    log::info!("read {} rows for table {}", frame.len(), args.table);
    let profile = Profile {
        user: args.user,
        password: args.password,
        host: args.host,
        port: args.port,
        dbname: args.dbname,
    }
    .env();
    let gateway = Gateway::connect(&profile).await?;
    gateway.ensure(&args.table, args.recreate, &schema).await?;
    gateway.load(&args.table, &schema, &frame).await?;
    let ref count = format!("SELECT COUNT(*) FROM {}", args.table);
    for line in gateway.query(count).await?.to_string().lines() {
        log::info!("{}", line);
    }
    gateway.close();
    Ok(())
}

/// Reads a delimited file with a leading header row into a typed frame.
///
/// Column types infer from the data: INT when every populated cell
/// parses as an integer, FLOAT when every populated cell parses as a
/// number, TEXT otherwise. Empty cells read as NULL. The leading
/// column becomes the primary key.
fn table(input: impl std::io::Read) -> anyhow::Result<(Schema, Frame)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.iter().map(String::from).collect::<Vec<_>>();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = (0..headers.len())
            .map(|at| record.get(at).unwrap_or("").to_string())
            .collect::<Vec<_>>();
        rows.push(row);
    }
    let kinds = (0..headers.len())
        .map(|at| kind(rows.iter().map(|row| row[at].as_str())))
        .collect::<Vec<_>>();
    let mut schema = Schema::new();
    for (name, &kind) in headers.iter().zip(kinds.iter()) {
        schema = schema.column(name.clone(), kind);
    }
    if let Some(first) = headers.first() {
        schema = schema.primary(first.clone()).not_null(first.clone());
    }
    let mut frame = Frame::new(headers);
    for row in &rows {
        frame.push(
            row.iter()
                .zip(kinds.iter())
                .map(|(raw, &kind)| cell(raw, kind))
                .collect(),
        );
    }
    Ok((schema, frame))
}

fn kind<'a>(cells: impl Iterator<Item = &'a str>) -> SqlType {
    let mut ints = true;
    let mut floats = true;
    for cell in cells.filter(|cell| !cell.is_empty()) {
        ints &= cell.trim().parse::<i64>().is_ok();
        floats &= cell.trim().parse::<f64>().is_ok();
    }
    match (ints, floats) {
        (true, _) => SqlType::Int,
        (false, true) => SqlType::Float,
        (false, false) => SqlType::Text,
    }
}

fn cell(raw: &str, kind: SqlType) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match kind {
        SqlType::Int | SqlType::BigInt => {
            raw.trim().parse::<i64>().map(Value::from).unwrap_or(Value::Null)
        }
        SqlType::Float => raw.trim().parse::<f64>().map(Value::from).unwrap_or(Value::Null),
        SqlType::Bool => raw.trim().parse::<bool>().map(Value::from).unwrap_or(Value::Null),
        SqlType::Text | SqlType::Varchar => Value::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_columns_and_leads_with_the_key() {
        let input = "id,price,rent\nA,1,2.5\nB,2,\n";
        let (schema, frame) = table(input.as_bytes()).unwrap();
        assert_eq!(
            schema.ddl(),
            "(id TEXT PRIMARY KEY NOT NULL, price INT, rent FLOAT)"
        );
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.value(1, "rent"), Some(&Value::Null));
    }

    #[test]
    fn mixed_numeric_column_reads_as_text() {
        let input = "k,v\nA,1\nB,x\n";
        let (schema, _) = table(input.as_bytes()).unwrap();
        assert_eq!(schema.kind("v"), Some(SqlType::Text));
    }

    #[test]
    fn inferred_frame_serializes_into_value_tuples() {
        let input = "id,price,rent\nA,1,2.5\nB,2,\n";
        let (schema, frame) = table(input.as_bytes()).unwrap();
        assert_eq!(
            frame.values(0..2, &schema, None),
            "('A',1,2.5),('B',2,NULL)"
        );
    }

    #[test]
    fn short_rows_pad_with_null() {
        let input = "a,b,c\nx,1\n";
        let (_, frame) = table(input.as_bytes()).unwrap();
        assert_eq!(frame.value(0, "c"), Some(&Value::Null));
    }
}
