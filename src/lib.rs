//! # sparkify — song-play warehouse loader
//!
//! Loads raw song metadata and listening-event logs from S3 into Redshift
//! staging tables, then builds a star schema from them.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sparkify::prelude::*;
//!
//! let config = Config::load("dwh.toml")?;
//! let registry = Registry::from_config(&config)?;
//!
//! let warehouse = Warehouse::connect_with(&config.cluster()?.connect_options()).await?;
//! warehouse.run(&registry, &Phase::ALL).await?;
//! ```
//!
//! ## Pipeline
//!
//! | Phase    | Tables   | Statement                         |
//! |----------|----------|-----------------------------------|
//! | `drop`   | all      | `DROP TABLE IF EXISTS ... CASCADE`|
//! | `create` | all      | `CREATE TABLE IF NOT EXISTS ...`  |
//! | `copy`   | staging  | `COPY ... FROM 's3://...'`        |
//! | `insert` | derived  | `INSERT INTO ... SELECT ...`      |

pub mod column;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod registry;
pub mod tables;

pub use column::Column;
pub use generator::{copy_statement, create_statement, drop_statement, insert_statement};

pub mod prelude {
    pub use crate::column::Column;
    pub use crate::config::{Config, trim_value};
    pub use crate::engine::{Executor, Warehouse, run_phases, run_statements};
    pub use crate::error::*;
    pub use crate::generator::*;
    pub use crate::registry::{CopyTarget, Job, Phase, Registry, Statements, TableKind, TableSpec};
}
