//! Data-plumbing toolkit: a PostgreSQL table gateway and a flat-file
//! ranking job.
//!
//! Two independent components live here and share no runtime:
//!
//! - [`Gateway`] — owns one database connection and mediates table
//!   lifecycle, batched writes, and reads into a [`Frame`]
//! - [`report`] — groups a delimited dataset by key, averages a numeric
//!   field per key, joins a directory dataset, and ranks the result
//!
//! ## Core Types
//!
//! - [`Schema`] — column types plus primary-key/not-null designations
//! - [`Fields`] — column-list SQL fragments
//! - [`Frame`] — rows × named columns, staged for insert or read back
//! - [`Value`] — cell values as they cross the SQL boundary
//! - [`Error`] — everything the gateway can surface
mod error;
mod fields;
mod frame;
mod schema;

#[cfg(feature = "database")]
mod gateway;

pub mod report;

pub use error::*;
pub use fields::*;
pub use frame::*;
pub use schema::*;

#[cfg(feature = "database")]
pub use gateway::*;

/// Averages and anything else ranked by the report job.
pub type Score = f64;

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` and writes DEBUG level to file, INFO to stderr.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
