//! Generation orchestration
//!
//! Drives one run: database discovery, table discovery, the base unit, then
//! one unit per table. The first error stops the run; units already written
//! stay on disk and a re-run regenerates them.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::codegen::{CodeGenerator, EmittedUnit, GoGenerator, OutputSink};
use crate::config::GenerationOptions;
use crate::error::GenError;
use crate::introspect::{Driver, SchemaFetcher};

/// Progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connecting,
    DiscoveringDatabase,
    DiscoveringTables,
    EmittingBase,
    EmittingTable(usize),
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Connecting => f.write_str("connecting"),
            Stage::DiscoveringDatabase => f.write_str("discovering database"),
            Stage::DiscoveringTables => f.write_str("discovering tables"),
            Stage::EmittingBase => f.write_str("emitting base unit"),
            Stage::EmittingTable(i) => write!(f, "emitting table #{}", i),
            Stage::Done => f.write_str("done"),
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub database_name: String,
    /// Tables generated, in generation order
    pub tables: Vec<String>,
    pub written: Vec<PathBuf>,
    /// Units whose existing file was kept
    pub skipped: Vec<PathBuf>,
}

/// Connect with `driver` and run a full generation
pub fn generate(
    driver: Driver,
    options: &GenerationOptions,
    sink: &mut dyn OutputSink,
) -> Result<GenerationReport, GenError> {
    let mut run = Orchestrator::new(options);
    run.enter(Stage::Connecting);
    let mut fetcher = driver
        .connect(&options.data_source_name)
        .inspect_err(|e| run.fail(e))?;
    run.run(fetcher.as_mut(), sink)
}

/// Sequential generation over one fetcher
pub struct Orchestrator<'a, G = GoGenerator> {
    options: &'a GenerationOptions,
    generator: G,
    stage: Stage,
}

impl<'a> Orchestrator<'a, GoGenerator> {
    pub fn new(options: &'a GenerationOptions) -> Self {
        Self::with_generator(options, GoGenerator::new())
    }
}

impl<'a, G: CodeGenerator> Orchestrator<'a, G> {
    pub fn with_generator(options: &'a GenerationOptions, generator: G) -> Self {
        Self {
            options,
            generator,
            stage: Stage::Connecting,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        debug!(stage = %stage, "Entering stage");
        self.stage = stage;
    }

    fn fail(&self, e: &GenError) {
        error!(stage = %self.stage, error = %e, "Generation failed");
    }

    /// Run every stage after connecting
    pub fn run(
        &mut self,
        fetcher: &mut dyn SchemaFetcher,
        sink: &mut dyn OutputSink,
    ) -> Result<GenerationReport, GenError> {
        self.run_stages(fetcher, sink).inspect_err(|e| self.fail(e))
    }

    fn run_stages(
        &mut self,
        fetcher: &mut dyn SchemaFetcher,
        sink: &mut dyn OutputSink,
    ) -> Result<GenerationReport, GenError> {
        let options = self.options;
        let force_cases = &options.force_cases;

        self.enter(Stage::DiscoveringDatabase);
        let database_name = fetcher.database_name()?;
        if database_name.is_empty() {
            return Err(GenError::NoDatabaseSelected);
        }
        info!(database = ?database_name, "Database selected");

        self.enter(Stage::DiscoveringTables);
        let tables = if options.table_names.is_empty() {
            fetcher.table_names()?
        } else {
            debug!(tables = ?options.table_names, "Using explicit table list");
            options.table_names.clone()
        };
        info!(tables = tables.len(), "Tables to generate");

        let mut report = GenerationReport {
            database_name: database_name.clone(),
            ..GenerationReport::default()
        };

        self.enter(Stage::EmittingBase);
        let base = self
            .generator
            .emit_base(&database_name, &tables, force_cases)?;
        self.hand_off(base, sink, &mut report)?;

        // output path -> table that produced it
        let mut emitted: HashMap<PathBuf, &str> = HashMap::new();
        for (i, table_name) in tables.iter().enumerate() {
            self.enter(Stage::EmittingTable(i));
            info!(table = ?table_name, "Generating");
            let unit =
                self.generator
                    .emit_table(fetcher, &database_name, table_name, force_cases)?;
            if let Some(previous) = emitted.insert(unit.path.clone(), table_name) {
                return Err(GenError::CodeGen {
                    table: table_name.clone(),
                    message: format!(
                        "output file {} was already generated for table '{}'",
                        unit.path.display(),
                        previous
                    ),
                });
            }
            self.hand_off(unit, sink, &mut report)?;
            report.tables.push(table_name.clone());
        }

        self.enter(Stage::Done);
        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            "Generation complete"
        );
        Ok(report)
    }

    fn hand_off(
        &self,
        unit: EmittedUnit,
        sink: &mut dyn OutputSink,
        report: &mut GenerationReport,
    ) -> Result<(), GenError> {
        let written = sink.write(
            &unit.path,
            unit.content.as_bytes(),
            self.options.force_overwrite,
        )?;
        if written {
            report.written.push(unit.path);
        } else {
            report.skipped.push(unit.path);
        }
        Ok(())
    }
}
