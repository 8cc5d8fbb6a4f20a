/// Everything the gateway can surface.
///
/// Connection failures collapse into the single [`Error::Connect`]: the
/// driver's own diagnostics are demoted to a debug log line and discarded.
/// Statement failures ride through unchanged as [`Error::Driver`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The driver rejected the connection profile or could not reach the
    /// host. The underlying cause is not retained.
    #[error("invalid postgres connection profile")]
    Connect,
    /// A field-list input that is neither a string nor an array of strings.
    #[error("unsupported field list shape: {0}")]
    FieldShape(String),
    /// A query result column of a type this crate does not map.
    #[cfg(feature = "database")]
    #[error("unsupported column type: {0}")]
    Column(String),
    /// Any statement failure, passed through from the driver.
    #[cfg(feature = "database")]
    #[error(transparent)]
    Driver(#[from] tokio_postgres::Error),
}
