//! Table registry and derived statement lists.
//!
//! The registry is built once from table declarations. Building it runs the
//! [generator](crate::generator) over every table and keeps the resulting
//! statements, grouped by [`Phase`], for the executor to consume.

use crate::column::Column;
use crate::config::Config;
use crate::error::{EtlError, EtlResult};
use crate::generator::{copy_statement, create_statement, drop_statement, insert_statement};
use crate::tables;

use serde::Serialize;
use std::fmt;

/// Name prefix reserved for staging tables.
pub const STAGING_PREFIX: &str = "staging_";

/// How a table is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKind {
    /// Bulk-loaded from object storage with COPY.
    Staging {
        source: String,
        json_path: Option<String>,
    },
    /// Populated from staging tables with INSERT ... SELECT.
    Derived { query: String },
}

/// Declaration of one warehouse table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_keys: Option<Vec<String>>,
    pub kind: TableKind,
}

impl TableSpec {
    /// A staging table loaded from `source`.
    pub fn staging(
        name: impl Into<String>,
        columns: Vec<Column>,
        source: impl Into<String>,
        json_path: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            primary_keys: None,
            kind: TableKind::Staging {
                source: source.into(),
                json_path,
            },
        }
    }

    /// A derived table populated by `query`.
    pub fn derived(name: impl Into<String>, columns: Vec<Column>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            primary_keys: None,
            kind: TableKind::Derived {
                query: query.into(),
            },
        }
    }

    /// Set the primary key columns.
    pub fn primary_key<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_staging(&self) -> bool {
        matches!(self.kind, TableKind::Staging { .. })
    }

    /// Columns listed in the INSERT: everything except identity columns.
    pub fn insert_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|c| !c.is_identity())
            .cloned()
            .collect()
    }

    fn validate(&self) -> EtlResult<()> {
        let prefixed = self.name.starts_with(STAGING_PREFIX);
        if prefixed != self.is_staging() {
            return Err(EtlError::registry(format!(
                "table '{}' is {} but the '{}' prefix is reserved for staging tables",
                self.name,
                if self.is_staging() { "staging" } else { "derived" },
                STAGING_PREFIX
            )));
        }
        if let Some(keys) = &self.primary_keys {
            for key in keys {
                if !self.columns.iter().any(|c| &c.name == key) {
                    return Err(EtlError::registry(format!(
                        "primary key '{}' is not a column of '{}'",
                        key, self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Credentials and region used by every COPY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub iam_role: String,
    pub region: String,
}

/// One of the four statement lists, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Drop,
    Create,
    Copy,
    Insert,
}

impl Phase {
    /// All phases, in the order they must run.
    pub const ALL: [Phase; 4] = [Phase::Drop, Phase::Create, Phase::Copy, Phase::Insert];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Drop => write!(f, "drop"),
            Phase::Create => write!(f, "create"),
            Phase::Copy => write!(f, "copy"),
            Phase::Insert => write!(f, "insert"),
        }
    }
}

/// A pipeline job: the phases it runs, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Drop and recreate every table.
    CreateTables,
    /// Load the staging tables, then populate the derived tables.
    Etl,
    /// `CreateTables` followed by `Etl`.
    Run,
}

impl Job {
    pub fn phases(self) -> &'static [Phase] {
        match self {
            Job::CreateTables => &[Phase::Drop, Phase::Create],
            Job::Etl => &[Phase::Copy, Phase::Insert],
            Job::Run => &Phase::ALL,
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::CreateTables => write!(f, "create-tables"),
            Job::Etl => write!(f, "etl"),
            Job::Run => write!(f, "run"),
        }
    }
}

/// The generated SQL, one list per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statements {
    pub drop: Vec<String>,
    pub create: Vec<String>,
    pub copy: Vec<String>,
    pub insert: Vec<String>,
}

impl Statements {
    pub fn phase(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Drop => &self.drop,
            Phase::Create => &self.create,
            Phase::Copy => &self.copy,
            Phase::Insert => &self.insert,
        }
    }
}

/// Table declarations together with their generated statements.
#[derive(Debug, Clone)]
pub struct Registry {
    tables: Vec<TableSpec>,
    statements: Statements,
}

impl Registry {
    /// Validate the tables and generate every statement.
    pub fn new(tables: Vec<TableSpec>, target: &CopyTarget) -> EtlResult<Self> {
        let mut statements = Statements::default();

        for table in &tables {
            table.validate()?;
            statements.drop.push(drop_statement(&table.name)?);
            statements.create.push(create_statement(
                &table.name,
                &table.columns,
                table.primary_keys.as_deref(),
            )?);
            match &table.kind {
                TableKind::Staging { source, json_path } => {
                    statements.copy.push(copy_statement(
                        &table.name,
                        source,
                        &target.iam_role,
                        json_path.as_deref(),
                        &target.region,
                    )?);
                }
                TableKind::Derived { query } => {
                    statements.insert.push(insert_statement(
                        &table.name,
                        &table.insert_columns(),
                        query,
                    )?);
                }
            }
        }

        tracing::debug!(
            tables = tables.len(),
            copies = statements.copy.len(),
            inserts = statements.insert.len(),
            "built registry"
        );
        Ok(Self { tables, statements })
    }

    /// The song-play star schema, with sources and credentials from `config`.
    pub fn from_config(config: &Config) -> EtlResult<Self> {
        let target = CopyTarget {
            iam_role: config.iam_role.arn.clone(),
            region: config.s3.region.clone(),
        };
        Self::new(tables::sparkify(&config.s3), &target)
    }

    pub fn tables(&self) -> &[TableSpec] {
        &self.tables
    }

    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    /// Statements of one phase, in declaration order.
    pub fn phase(&self, phase: Phase) -> &[String] {
        self.statements.phase(phase)
    }
}
