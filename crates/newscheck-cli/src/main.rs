mod display;
mod evaluate;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use newscheck_ai::{ModelContext, Pipeline, PipelineConfig};
use newscheck_core::{AggregationMode, ErrorResponse, RawPredictRequest};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "newscheck", version, about = "Fake news classification over a fitted model ensemble")]
struct Cli {
    /// Directory holding vectorizer.json and the four model artifacts.
    #[arg(long, global = true, env = "NEWSCHECK_MODELS_DIR", default_value = "models")]
    models_dir: PathBuf,

    /// Aggregation mode used when a request does not name one.
    #[arg(long, global = true, env = "NEWSCHECK_DEFAULT_MODE", default_value = "PRIMARY")]
    default_mode: AggregationMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the artifacts and print a health summary as JSON.
    Check,
    /// Classify a single article.
    Predict {
        /// Article text. Read from stdin when omitted.
        #[arg(long, conflicts_with = "json")]
        text: Option<String>,
        /// PRIMARY or VOTE for this request.
        #[arg(long, conflicts_with = "json")]
        mode: Option<String>,
        /// Read a JSON request body (`news`/`text`, `mode`) from stdin.
        #[arg(long)]
        json: bool,
        /// Print a readable card instead of the response JSON.
        #[arg(long)]
        card: bool,
    },
    /// Score every model against a labelled JSONL file.
    Evaluate {
        /// One `{"text": ..., "label": 0|1}` object per line.
        path: PathBuf,
        /// Aggregation mode for the final label.
        #[arg(long)]
        mode: Option<AggregationMode>,
        /// Records scored per blocking task.
        #[arg(long, default_value_t = 256)]
        chunk_size: usize,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let config = PipelineConfig {
        default_mode: cli.default_mode,
        ..PipelineConfig::default()
    };

    match cli.command {
        Command::Check => {
            check(&cli.models_dir, config)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Predict {
            text,
            mode,
            json,
            card,
        } => {
            let pipeline = load_pipeline(&cli.models_dir, config)?;
            let raw = if json {
                let body = read_stdin()?;
                serde_json::from_str(&body).context("parsing request JSON")?
            } else {
                let text = match text {
                    Some(text) => text,
                    None => read_stdin()?,
                };
                RawPredictRequest {
                    text: Some(text),
                    mode,
                    ..Default::default()
                }
            };
            predict(&pipeline, raw, card, &mut std::io::stdout().lock())
        }
        Command::Evaluate {
            path,
            mode,
            chunk_size,
            json,
        } => {
            let pipeline = load_pipeline(&cli.models_dir, config)?;
            let records = evaluate::read_records(&path).await?;
            let report = evaluate::run(&pipeline, records, mode, chunk_size).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_report(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_pipeline(dir: &Path, config: PipelineConfig) -> anyhow::Result<Pipeline> {
    let context = ModelContext::load(dir)
        .with_context(|| format!("loading model artifacts from {}", dir.display()))?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        default_mode = %config.default_mode,
        primary = %config.primary,
        "newscheck ready"
    );
    Ok(Pipeline::new(Arc::new(context), config))
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    Ok(buf)
}

fn check(dir: &Path, config: PipelineConfig) -> anyhow::Result<()> {
    let pipeline = load_pipeline(dir, config)?;
    let summary = pipeline.context().summary();
    let health = serde_json::json!({
        "status": "ok",
        "models_dir": dir.display().to_string(),
        "default_mode": config.default_mode,
        "primary": config.primary,
        "dim": summary.dim,
        "models": summary.models,
    });
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

/// Classify one request, writing the response (or the error body) to `out`.
fn predict(
    pipeline: &Pipeline,
    raw: RawPredictRequest,
    card: bool,
    out: &mut impl Write,
) -> anyhow::Result<ExitCode> {
    let request = match raw.into_request(pipeline.config().primary) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejected request");
            writeln!(out, "{}", serde_json::to_string(&ErrorResponse::from(&e))?)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let result = pipeline.predict(&request);
    if card {
        display::write_prediction_card(out, &result)?;
    } else {
        writeln!(out, "{}", serde_json::to_string_pretty(&result.to_response())?)?;
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_pipeline() -> Pipeline {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../newscheck-ai/tests/fixtures/toy");
        load_pipeline(&dir, PipelineConfig::default()).unwrap()
    }

    fn run_predict(raw: RawPredictRequest, card: bool) -> (ExitCode, String) {
        let mut out = Vec::new();
        let code = predict(&toy_pipeline(), raw, card, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn predict_rejects_empty_text_with_error_body() {
        let raw = RawPredictRequest {
            text: Some("   ".into()),
            ..Default::default()
        };
        let (code, out) = run_predict(raw, false);
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(out.trim_end(), r#"{"error":"Provide 'news' (or 'text') in JSON body"}"#);
    }

    #[test]
    fn predict_rejects_unknown_mode() {
        let raw = RawPredictRequest {
            text: Some("story".into()),
            mode: Some("MAJORITY".into()),
            ..Default::default()
        };
        let (code, out) = run_predict(raw, true);
        assert_eq!(code, ExitCode::FAILURE);
        let body: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(body["error"].as_str().unwrap().contains("MAJORITY"));
    }

    #[test]
    fn predict_writes_response_json() {
        let raw: RawPredictRequest =
            serde_json::from_str(r#"{"news": "Officials said in a statement", "mode": "VOTE"}"#)
                .unwrap();
        let (code, out) = run_predict(raw, false);
        assert_eq!(code, ExitCode::SUCCESS);

        let body: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(body["mode"], "VOTE");
        assert_eq!(body["final"], "Not A Fake News");
        assert_eq!(body["models"]["RF"], "Not A Fake News");
        assert!(body["primary_probability_real"].as_f64().unwrap() > 0.5);
    }

    #[test]
    fn predict_card_output() {
        let raw = RawPredictRequest {
            text: Some("SHOCKING!!! Breaking news you won't believe".into()),
            ..Default::default()
        };
        let (code, out) = run_predict(raw, true);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.starts_with("=== Fake News ===\nmode PRIMARY (primary LR)\n"));
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["newscheck", "check"]).unwrap();
        assert_eq!(cli.models_dir, PathBuf::from("models"));
        assert_eq!(cli.default_mode, AggregationMode::Primary);
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn default_mode_is_case_insensitive() {
        let cli = Cli::try_parse_from(["newscheck", "--default-mode", "vote", "check"]).unwrap();
        assert_eq!(cli.default_mode, AggregationMode::Vote);

        assert!(Cli::try_parse_from(["newscheck", "--default-mode", "majority", "check"]).is_err());
    }

    #[test]
    fn predict_text_and_json_are_exclusive() {
        let parsed = Cli::try_parse_from(["newscheck", "predict", "--text", "story", "--json"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from([
            "newscheck",
            "predict",
            "--text",
            "story",
            "--mode",
            "VOTE",
            "--models-dir",
            "/srv/models",
        ])
        .unwrap();
        assert_eq!(cli.models_dir, PathBuf::from("/srv/models"));
        match cli.command {
            Command::Predict { text, mode, json, card } => {
                assert_eq!(text.as_deref(), Some("story"));
                assert_eq!(mode.as_deref(), Some("VOTE"));
                assert!(!json && !card);
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn evaluate_arguments() {
        let cli =
            Cli::try_parse_from(["newscheck", "evaluate", "data.jsonl", "--mode", "VOTE"]).unwrap();
        match cli.command {
            Command::Evaluate {
                path,
                mode,
                chunk_size,
                json,
            } => {
                assert_eq!(path, PathBuf::from("data.jsonl"));
                assert_eq!(mode, Some(AggregationMode::Vote));
                assert_eq!(chunk_size, 256);
                assert!(!json);
            }
            _ => panic!("expected evaluate"),
        }
    }
}
