use crate::Error;
use crate::Fields;
use crate::Frame;
use crate::Schema;
use crate::Value;
use tokio_postgres::Client;
use tokio_postgres::Config;
use tokio_postgres::NoTls;

/// Rows per INSERT statement issued by [`Gateway::load`].
pub const BATCH_ROWS: usize = 500;

/// Connection profile.
///
/// Unset fields fall back to the conventional libpq environment
/// variables via [`Profile::env`]. There are no further defaults; a
/// profile still missing required fields fails at [`Gateway::connect`].
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
}

impl Profile {
    /// Fills unset fields from PGUSER, PGPASSWORD, PGHOST, PGPORT and
    /// PGDATABASE.
    pub fn env(mut self) -> Self {
        let var = |key: &str| std::env::var(key).ok();
        self.user = self.user.take().or_else(|| var("PGUSER"));
        self.password = self.password.take().or_else(|| var("PGPASSWORD"));
        self.host = self.host.take().or_else(|| var("PGHOST"));
        self.port = self
            .port
            .take()
            .or_else(|| var("PGPORT").and_then(|p| p.parse().ok()));
        self.dbname = self.dbname.take().or_else(|| var("PGDATABASE"));
        self
    }

    fn config(&self) -> Config {
        let mut config = Config::new();
        if let Some(host) = self.host.as_deref() {
            config.host(host);
        }
        if let Some(port) = self.port {
            config.port(port);
        }
        if let Some(user) = self.user.as_deref() {
            config.user(user);
        }
        if let Some(password) = self.password.as_deref() {
            config.password(password);
        }
        if let Some(dbname) = self.dbname.as_deref() {
            config.dbname(dbname);
        }
        config
    }
}

/// One write against a table.
///
/// Inserts carry a prebuilt value-list string for the whole batch.
/// Updates carry parallel key and value-tuple slices plus the column
/// the keys match against.
pub enum Write<'a> {
    Insert {
        values: &'a str,
    },
    Update {
        keys: &'a [&'a str],
        values: &'a [&'a str],
        key_field: &'a str,
    },
}

/// A connected PostgreSQL session.
///
/// Owns the client and the background connection task; dropping the
/// gateway (or calling [`Gateway::close`]) stops both.
pub struct Gateway {
    client: Client,
    connection: tokio::task::JoinHandle<()>,
}

impl Gateway {
    /// Opens a session from a connection profile.
    ///
    /// Every driver failure collapses into [`Error::Connect`]; the
    /// cause is demoted to a debug log line and dropped.
    pub async fn connect(profile: &Profile) -> Result<Self, Error> {
        log::info!("connecting to database");
        match profile.config().connect(NoTls).await {
            Err(cause) => {
                log::debug!("connection failed: {}", cause);
                Err(Error::Connect)
            }
            Ok((client, connection)) => {
                let connection = tokio::spawn(async move {
                    if let Err(cause) = connection.await {
                        log::error!("connection error: {}", cause);
                    }
                });
                Ok(Self { client, connection })
            }
        }
    }

    /// Ends the session. Dropping the gateway does the same.
    pub fn close(self) {}

    /// Whether a table with this name exists, per information_schema.
    ///
    /// The name is lowercased before the lookup. A failure of the
    /// lookup itself also reads as false.
    pub async fn exists(&self, table: &str) -> bool {
        const SQL: &str =
            "SELECT EXISTS(SELECT * FROM information_schema.tables WHERE table_name = $1)";
        let ref table = table.to_lowercase();
        self.client
            .query_one(SQL, &[table])
            .await
            .ok()
            .map(|row| row.get::<_, bool>(0))
            .unwrap_or(false)
    }

    /// Creates the table from the schema if it is absent. With
    /// `recreate`, an existing table is dropped and built again; the
    /// drop and the create run as separate statements with no
    /// transaction around them.
    pub async fn ensure(&self, table: &str, recreate: bool, schema: &Schema) -> Result<(), Error> {
        match (self.exists(table).await, recreate) {
            (false, _) => self.create_table(table, &schema.ddl()).await,
            (true, false) => Ok(()),
            (true, true) => {
                self.drop_table(table).await?;
                self.create_table(table, &schema.ddl()).await
            }
        }
    }

    /// Inserts a whole frame, [`BATCH_ROWS`] rows per statement.
    ///
    /// Each chunk commits on its own. A failing chunk leaves earlier
    /// chunks in place and later chunks unattempted; the driver error
    /// propagates as-is.
    pub async fn load(&self, table: &str, schema: &Schema, frame: &Frame) -> Result<(), Error> {
        let ref fields = Fields::Columns(schema.names().map(String::from).collect());
        for (start, end) in batches(frame.len()) {
            log::info!("processing rows {} to {}", start, end);
            let ref values = frame.values(start..end, schema, None);
            self.put(table, fields, Write::Insert { values }).await?;
        }
        Ok(())
    }

    /// Writes to a table.
    ///
    /// An insert issues one statement for the whole value list; an
    /// empty value list is a no-op. An update issues one statement per
    /// key, each committed on its own; keys bind as text.
    pub async fn put(&self, table: &str, fields: &Fields, write: Write<'_>) -> Result<(), Error> {
        match write {
            Write::Insert { values: "" } => Ok(()),
            Write::Insert { values } => {
                let ref sql = insert_sql(table, fields, values);
                self.client.execute(sql, &[]).await?;
                Ok(())
            }
            Write::Update {
                keys,
                values,
                key_field,
            } => {
                for (&key, &value) in keys.iter().zip(values.iter()) {
                    let ref sql = update_sql(table, fields, value, key_field);
                    self.client.execute(sql, &[&key]).await?;
                }
                Ok(())
            }
        }
    }

    /// Runs a raw read query and gathers the whole result into a frame.
    ///
    /// The result buffers in full, so memory use tracks result size.
    /// Column types outside the mapped set surface [`Error::Column`].
    pub async fn query(&self, sql: &str) -> Result<Frame, Error> {
        let statement = self.client.prepare(sql).await?;
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let mut frame = Frame::new(columns);
        for ref row in self.client.query(&statement, &[]).await? {
            frame.push(decode(row)?);
        }
        Ok(frame)
    }

    /// Issues a literal `CREATE TABLE`.
    pub async fn create_table(&self, table: &str, ddl: &str) -> Result<(), Error> {
        let ref sql = format!("CREATE TABLE {} {}", table, ddl);
        self.client.execute(sql, &[]).await?;
        Ok(())
    }

    /// Empties then drops a table, as two independent statements.
    /// A failure between the two leaves an empty table behind.
    pub async fn drop_table(&self, table: &str) -> Result<(), Error> {
        let ref truncate = format!("TRUNCATE TABLE {}", table);
        let ref drop = format!("DROP TABLE {}", table);
        self.client.execute(truncate, &[]).await?;
        self.client.execute(drop, &[]).await?;
        Ok(())
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.connection.abort();
    }
}

/// Chunk boundaries for a row count: (0, 500), (500, 1000), …
fn batches(total: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..total)
        .step_by(BATCH_ROWS)
        .map(move |start| (start, (start + BATCH_ROWS).min(total)))
}

fn insert_sql(table: &str, fields: &Fields, values: &str) -> String {
    format!("INSERT INTO {} {} VALUES {}", table, fields.sql(false), values)
}

fn update_sql(table: &str, fields: &Fields, value: &str, key_field: &str) -> String {
    format!(
        "UPDATE {} SET {} = {} WHERE {} = $1",
        table,
        fields.sql(false),
        value,
        key_field
    )
}

fn decode(row: &tokio_postgres::Row) -> Result<Vec<Value>, Error> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(at, column)| match column.type_().name() {
            "bool" => Ok(Value::from(row.get::<_, Option<bool>>(at))),
            "int2" => Ok(Value::from(row.get::<_, Option<i16>>(at).map(i64::from))),
            "int4" => Ok(Value::from(row.get::<_, Option<i32>>(at).map(i64::from))),
            "int8" => Ok(Value::from(row.get::<_, Option<i64>>(at))),
            "float4" => Ok(Value::from(row.get::<_, Option<f32>>(at).map(f64::from))),
            "float8" => Ok(Value::from(row.get::<_, Option<f64>>(at))),
            "text" | "varchar" | "bpchar" | "name" => {
                Ok(Value::from(row.get::<_, Option<String>>(at)))
            }
            other => Err(Error::Column(other.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqlType;

    #[test]
    fn batches_split_at_the_chunk_size() {
        let chunks = batches(1200).collect::<Vec<_>>();
        assert_eq!(chunks, vec![(0, 500), (500, 1000), (1000, 1200)]);
    }

    #[test]
    fn batches_of_nothing() {
        assert_eq!(batches(0).count(), 0);
    }

    #[test]
    fn exact_multiple_has_no_stub_chunk() {
        let chunks = batches(1000).collect::<Vec<_>>();
        assert_eq!(chunks, vec![(0, 500), (500, 1000)]);
    }

    #[test]
    fn insert_statement_shape() {
        let fields = Fields::from(&["a", "b"][..]);
        assert_eq!(
            insert_sql("t", &fields, "('x',1)"),
            "INSERT INTO t (a,b) VALUES ('x',1)"
        );
    }

    #[test]
    fn update_statement_shape() {
        let fields = Fields::from(&["a", "b"][..]);
        assert_eq!(
            update_sql("t", &fields, "('x',1)", "id"),
            "UPDATE t SET (a,b) = ('x',1) WHERE id = $1"
        );
    }

    #[test]
    fn chunks_serialize_five_hundred_tuples_apiece() {
        let schema = Schema::new()
            .column("k", SqlType::Text)
            .column("v", SqlType::Int);
        let mut frame = Frame::new(vec!["k".into(), "v".into()]);
        for i in 0..1200i64 {
            frame.push(vec![Value::from(format!("k{}", i)), Value::from(i)]);
        }
        let tuples = batches(frame.len())
            .map(|(start, end)| frame.values(start..end, &schema, None))
            .map(|values| values.matches("),(").count() + 1)
            .collect::<Vec<_>>();
        assert_eq!(tuples, vec![500, 500, 200]);
    }
}
