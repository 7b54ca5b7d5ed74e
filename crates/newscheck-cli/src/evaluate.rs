//! Batch accuracy over a labelled JSONL file.
//!
//! Records are split into chunks and scored on tokio's blocking pool; every
//! chunk shares the same loaded [`Pipeline`].

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use newscheck_ai::Pipeline;
use newscheck_core::{AggregationMode, Label, ModelId, PredictionResult, RawPredictRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One labelled article.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelledRecord {
    #[serde(default)]
    pub news: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub label: Label,
}

/// Running hit counts for one or more chunks.
#[derive(Debug, Default, Clone, PartialEq)]
struct Tally {
    scored: usize,
    skipped: usize,
    model_hits: [usize; ModelId::COUNT],
    final_hits: usize,
}

impl Tally {
    fn record(&mut self, result: &PredictionResult, truth: Label) {
        self.scored += 1;
        for (id, label) in result.labels().iter() {
            if *label == truth {
                self.model_hits[id.index()] += 1;
            }
        }
        if result.final_label == truth {
            self.final_hits += 1;
        }
    }

    fn merge(&mut self, other: Tally) {
        self.scored += other.scored;
        self.skipped += other.skipped;
        for (hits, more) in self.model_hits.iter_mut().zip(other.model_hits) {
            *hits += more;
        }
        self.final_hits += other.final_hits;
    }

    fn accuracy(&self, hits: usize) -> f64 {
        if self.scored == 0 {
            0.0
        } else {
            hits as f64 / self.scored as f64
        }
    }
}

/// Accuracy summary for one evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub mode: AggregationMode,
    pub primary: ModelId,
    pub scored: usize,
    pub skipped: usize,
    /// Fraction of scored records each model labelled correctly.
    pub models: BTreeMap<ModelId, f64>,
    pub final_accuracy: f64,
    pub elapsed_secs: f64,
}

pub async fn read_records(path: &Path) -> anyhow::Result<Vec<LabelledRecord>> {
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let records = parse_records(&body).with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "loaded evaluation set");
    Ok(records)
}

/// Parse JSONL, ignoring blank lines.
pub fn parse_records(body: &str) -> anyhow::Result<Vec<LabelledRecord>> {
    body.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", i + 1))
        })
        .collect()
}

/// Score `records` with every model and the aggregated label.
///
/// Records whose text is empty are skipped, not failed.
pub async fn run(
    pipeline: &Pipeline,
    records: Vec<LabelledRecord>,
    mode: Option<AggregationMode>,
    chunk_size: usize,
) -> anyhow::Result<EvalReport> {
    let start = Instant::now();
    let chunk_size = chunk_size.max(1);

    let tasks: Vec<_> = records
        .chunks(chunk_size)
        .map(|chunk| {
            let chunk = chunk.to_vec();
            let pipeline = pipeline.clone();
            tokio::task::spawn_blocking(move || score_chunk(&pipeline, chunk, mode))
        })
        .collect();

    let mut tally = Tally::default();
    for joined in futures::future::join_all(tasks).await {
        tally.merge(joined.context("evaluation task failed")?);
    }

    let report = EvalReport {
        mode: mode.unwrap_or(pipeline.config().default_mode),
        primary: pipeline.config().primary,
        scored: tally.scored,
        skipped: tally.skipped,
        models: ModelId::ALL
            .into_iter()
            .map(|id| (id, tally.accuracy(tally.model_hits[id.index()])))
            .collect(),
        final_accuracy: tally.accuracy(tally.final_hits),
        elapsed_secs: start.elapsed().as_secs_f64(),
    };
    info!(
        scored = report.scored,
        skipped = report.skipped,
        accuracy = report.final_accuracy,
        "evaluation complete"
    );
    Ok(report)
}

fn score_chunk(
    pipeline: &Pipeline,
    chunk: Vec<LabelledRecord>,
    mode: Option<AggregationMode>,
) -> Tally {
    let primary = pipeline.config().primary;
    let mut tally = Tally::default();
    for record in chunk {
        let raw = RawPredictRequest {
            news: record.news,
            text: record.text,
            mode: mode.map(|m| m.to_string()),
        };
        match raw.into_request(primary) {
            Ok(request) => tally.record(&pipeline.predict(&request), record.label),
            Err(e) => {
                warn!(error = %e, "skipping record");
                tally.skipped += 1;
            }
        }
    }
    tally
}
