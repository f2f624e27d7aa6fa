//! One processing run, end to end.
//!
//! ```text
//! bytes + name ─► load ─► project + replace ─► annotate ─► serialize + name
//! ```
//!
//! [`Pipeline`] holds what outlives a run (settings and the cached schema);
//! [`RunContext`] holds the operator's choices for one run.

use crate::annotate::{OutputDocument, annotate};
use crate::config::Settings;
use crate::encoding::EncodingPolicy;
use crate::error::Result;
use crate::export::{ExportArtifact, ExportOptions, export_at};
use crate::io::{LoadOptions, LoadedSource, load_source};
use crate::replace::{ColumnPreset, ReplacementRule, apply_presets, project_and_replace};
use crate::schema::SchemaResolver;
use crate::table::Table;
use chrono::{Local, NaiveDateTime};
use tracing::info;

/// The operator's choices for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Output columns in output order. `None` selects every loaded column;
    /// `Some(vec![])` selects nothing and the run produces no output.
    pub selection: Option<Vec<String>>,
    /// Applied in order; the last rule for a column wins.
    pub rules: Vec<ReplacementRule>,
    pub policy: EncodingPolicy,
}

impl RunContext {
    #[must_use]
    pub fn new(policy: EncodingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn replace(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.rules.push(ReplacementRule::new(column, value));
        self
    }
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Exported(ExportArtifact),
    /// The selection was empty; nothing was produced.
    NothingSelected,
}

/// Long-lived run configuration plus the cached column schema.
#[derive(Debug)]
pub struct Pipeline {
    load: LoadOptions,
    presets: Vec<ColumnPreset>,
    export: ExportOptions,
    resolver: SchemaResolver,
}

impl Pipeline {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self::with_resolver(settings, settings.schema_resolver())
    }

    #[must_use]
    pub fn with_resolver(settings: &Settings, resolver: SchemaResolver) -> Self {
        Self {
            load: settings.source.clone(),
            presets: settings.presets.clone(),
            export: settings.export_options(),
            resolver,
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Load an uploaded file.
    ///
    /// # Errors
    /// Returns [`PrepError::SourceLoad`](crate::PrepError::SourceLoad) if the bytes are not a table.
    pub fn load(&self, name: &str, bytes: &[u8]) -> Result<LoadedSource> {
        load_source(name, bytes, &self.load)
    }

    /// Fill preset defaults into `rules` and check preset choice lists.
    ///
    /// # Errors
    /// Returns [`PrepError::InvalidRule`](crate::PrepError::InvalidRule).
    pub fn prepare_rules(&self, rules: &[ReplacementRule]) -> Result<Vec<ReplacementRule>> {
        apply_presets(rules.to_vec(), &self.presets)
    }

    /// Project, replace and annotate `table`.
    ///
    /// Returns `Ok(None)` when the context selects no column.
    ///
    /// # Errors
    /// Returns an error for invalid rules or a selection naming unknown columns.
    pub fn transform(&self, table: &Table, ctx: &RunContext) -> Result<Option<OutputDocument>> {
        let rules = self.prepare_rules(&ctx.rules)?;
        self.transform_prepared(table, ctx.selection.as_deref(), &rules)
    }

    fn transform_prepared(
        &self,
        table: &Table,
        selection: Option<&[String]>,
        rules: &[ReplacementRule],
    ) -> Result<Option<OutputDocument>> {
        let replaced = match selection {
            Some(cols) => project_and_replace(table, cols, rules)?,
            None => project_and_replace(table, table.columns(), rules)?,
        };
        let Some(replaced) = replaced else {
            return Ok(None);
        };
        Ok(Some(annotate(replaced, self.resolver.schema())))
    }

    /// Run the whole pipeline on one uploaded file.
    ///
    /// # Errors
    /// Fails on invalid rules, unloadable input, unknown selected columns or
    /// characters the output encoding cannot hold. A missing or broken
    /// registry is not an error.
    pub fn run(&self, name: &str, bytes: &[u8], ctx: &RunContext) -> Result<RunOutcome> {
        self.run_at(name, bytes, ctx, Local::now().naive_local())
    }

    /// [`Pipeline::run`] with an explicit timestamp for the output name.
    ///
    /// # Errors
    /// See [`Pipeline::run`].
    pub fn run_at(
        &self,
        name: &str,
        bytes: &[u8],
        ctx: &RunContext,
        at: NaiveDateTime,
    ) -> Result<RunOutcome> {
        let rules = self.prepare_rules(&ctx.rules)?;
        let source = self.load(name, bytes)?;
        let Some(doc) = self.transform_prepared(&source.table, ctx.selection.as_deref(), &rules)?
        else {
            info!(source = name, "no columns selected; nothing to export");
            return Ok(RunOutcome::NothingSelected);
        };
        let artifact = export_at(&doc, &source.stem, ctx.policy, &self.export, at)?;
        Ok(RunOutcome::Exported(artifact))
    }
}
