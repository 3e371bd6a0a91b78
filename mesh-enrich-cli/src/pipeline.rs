//! The enrichment run: read rows, enrich, write, summarize

use crate::cli::EnrichConfig;
use crate::error::{CliError, CliResult};
use crate::progress::row_progress;
use crate::tabular::{count_rows, InputTable, OutputTable};
use futures::StreamExt;
use mesh_enrich_core::{
    ConceptResolver, EnrichedRow, EnrichmentStats, HierarchyClassifier, HttpVocabularyClient,
    RowEnricher, TopLevelLabelCache, VocabularyClient,
};
use std::cell::RefCell;
use std::pin::pin;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rows between debug progress lines.
const DEBUG_EVERY: usize = 100;
/// Rows between info progress lines.
const INFO_EVERY: usize = 500;

/// Enrich `config.input` into `config.output`.
///
/// Row failures are counted, not returned; only local I/O and setup
/// problems are errors.
pub async fn run(config: &EnrichConfig) -> CliResult<EnrichmentStats> {
    let client: Arc<dyn VocabularyClient> =
        Arc::new(HttpVocabularyClient::new(&config.client_config())?);
    let cache = Arc::new(TopLevelLabelCache::new(config.cache_capacity));
    let enricher = RowEnricher::new(
        ConceptResolver::new(client.clone()),
        HierarchyClassifier::new(client, cache),
        config.shape,
    );
    run_with(config, &enricher).await
}

/// [`run`] against an already-built enricher.
pub async fn run_with(config: &EnrichConfig, enricher: &RowEnricher) -> CliResult<EnrichmentStats> {
    let shape = enricher.shape();
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        shape = %shape,
        concurrency = config.concurrency,
        delay_secs = config.delay,
        "Starting MeSH enrichment"
    );

    debug!(input = %config.input.display(), "counting rows");
    let total_rows = count_rows(&config.input, config.input_delimiter)?;
    debug!(total_rows, "rows to process");

    let table = InputTable::open(&config.input, config.input_delimiter)?;
    let id_index = table.column_index(&config.id_column);
    if id_index.is_none() {
        warn!(
            column = %config.id_column,
            "identifier column not found in header; every row will be reported as invalid"
        );
    }

    let mut header = table.headers().to_vec();
    header.extend(shape.columns().iter().map(|c| c.to_string()));
    let mut out = OutputTable::create(&config.output, config.resolved_output_format(), &header)?;

    let bar = row_progress(total_rows, config.show_progress());
    let mut stats = EnrichmentStats::new();

    // A read error ends the row iterator; it is reported once the rows
    // already in flight have been written.
    let read_error: RefCell<Option<csv::Error>> = RefCell::new(None);
    let rows = table.into_rows().map_while(|r| match r {
        Ok(row) => Some(row),
        Err(e) => {
            *read_error.borrow_mut() = Some(e);
            None
        }
    });

    {
        let mut results = pin!(enricher.enrich_ordered(rows, id_index, config.concurrency));
        while let Some(row) = results.next().await {
            bar.suspend(|| log_row(&row));
            stats.record(&row);
            out.write(row.into_record(shape))?;
            bar.inc(1);

            if stats.total % INFO_EVERY == 0 {
                bar.suspend(|| info!(processed = stats.total, total_rows, "progress"));
            } else if stats.total % DEBUG_EVERY == 0 {
                bar.suspend(|| debug!(processed = stats.total, total_rows, "progress"));
            }
        }
    }
    bar.finish_and_clear();

    if let Some(e) = read_error.into_inner() {
        return Err(CliError::Input(format!(
            "failed to read {}: {e}",
            config.input.display()
        )));
    }
    out.finish()?;

    debug!(cached_codes = enricher.classifier().cache().len(), "top-level label cache");
    let output = config.output.display().to_string();
    for line in stats.summary(&output).lines() {
        info!("{line}");
    }
    Ok(stats)
}

fn log_row(row: &EnrichedRow) {
    match &row.outcome {
        Err(diag) => warn!(row = row.source.number, kind = %diag.kind, "{}", diag.message),
        Ok(enrichment) => {
            if let Some(target) = &enrichment.record.redirect_target {
                debug!(
                    row = row.source.number,
                    id = %enrichment.record.identifier,
                    target = %target,
                    "tree numbers taken from preferredMappedTo"
                );
            }
        }
    }
}
