//! One full run: parse the export, plan batches, reconcile, and build the
//! catalog once every batch has resolved.

use opentelemetry::KeyValue;
use tracing::info;

use crate::batch;
use crate::catalog::{self, CatalogFile};
use crate::config::{Config, MAX_BATCH_SIZE};
use crate::engine::{EngineConfig, Reconciler};
use crate::error::Result;
use crate::event::{Emitter, EventKind, ProgressSink};
use crate::inventory::{self, SkippedLine};
use crate::lookup::LookupService;
use crate::model::RunContext;
use crate::telemetry::metrics;

/// Everything a run produced.
#[derive(Debug)]
pub struct PipelineOutput {
    pub run: RunContext,
    pub skipped: Vec<SkippedLine>,
    pub catalog: CatalogFile,
}

pub struct Pipeline<'a> {
    lookup: &'a dyn LookupService,
    sink: &'a dyn ProgressSink,
    batch_size: usize,
    engine: EngineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(lookup: &'a dyn LookupService, sink: &'a dyn ProgressSink) -> Self {
        Self {
            lookup,
            sink,
            batch_size: MAX_BATCH_SIZE,
            engine: EngineConfig::default(),
        }
    }

    pub fn from_config(
        config: &Config,
        lookup: &'a dyn LookupService,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self::new(lookup, sink)
            .batch_size(config.batch_size)
            .engine(EngineConfig::from(config))
    }

    /// Cards per lookup call, capped at [`MAX_BATCH_SIZE`].
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.min(MAX_BATCH_SIZE);
        self
    }

    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Run the whole pipeline over one export's text.
    ///
    /// Each call is independent: nothing from a previous run is visible.
    pub async fn run(&self, text: &str) -> Result<PipelineOutput> {
        let events = Emitter::new(self.sink);

        let parsed = inventory::parse(text);
        for skipped in &parsed.skipped {
            events.warning(EventKind::InputRowSkipped {
                line: skipped.line,
                reason: skipped.reason.to_string(),
            });
        }
        if !parsed.skipped.is_empty() {
            metrics::input_rows_skipped().add(
                parsed.skipped.len() as u64,
                &[KeyValue::new("stage", "parse")],
            );
        }
        events.info(EventKind::InputParsed {
            accepted: parsed.records.len(),
            skipped: parsed.skipped.len(),
        });

        let batches = batch::plan(&parsed.records, self.batch_size);
        info!(
            records = parsed.records.len(),
            batches = batches.len(),
            batch_size = self.batch_size,
            "batches planned"
        );

        let reconciler = Reconciler::new(self.lookup, self.engine.clone(), &events);
        let mut exported = None;
        let run = reconciler
            .run(&batches, |ctx| {
                exported = Some(catalog::export(&ctx.catalog, &events));
            })
            .await?;

        let catalog = exported.transpose()?.unwrap_or_default();
        Ok(PipelineOutput {
            run,
            skipped: parsed.skipped,
            catalog,
        })
    }
}
