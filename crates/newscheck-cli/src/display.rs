//! Human-readable rendering for predictions and evaluation reports.

use std::io::{self, Write};

use newscheck_core::PredictionResult;

use crate::evaluate::EvalReport;

/// Write a single prediction as a vertical card.
pub fn write_prediction_card(out: &mut impl Write, result: &PredictionResult) -> io::Result<()> {
    writeln!(out, "=== {} ===", result.final_label)?;
    writeln!(out, "mode {} (primary {})", result.mode, result.primary)?;
    writeln!(out)?;

    writeln!(out, "Models")?;
    for (id, prediction) in result.predictions.iter() {
        let marker = if id == result.primary { "*" } else { " " };
        writeln!(
            out,
            "  {marker}{:<4} {:<16} {}",
            id.as_str(),
            prediction.label.as_str(),
            format_probability(prediction.probability)
        )?;
    }
    Ok(())
}

/// Print evaluation accuracy as a small table.
pub fn print_report(report: &EvalReport) {
    println!("=== Evaluation ===");
    println!(
        "{} scored, {} skipped in {:.2}s",
        report.scored, report.skipped, report.elapsed_secs
    );
    println!();

    println!("Accuracy");
    for (id, accuracy) in &report.models {
        let marker = if *id == report.primary { "*" } else { " " };
        println!("  {marker}{:<26} {}", id.as_str(), format_percent(*accuracy));
    }
    println!(
        "   {:<26} {}",
        format!("final ({})", report.mode),
        format_percent(report.final_accuracy)
    );
}

fn format_probability(p: Option<f64>) -> String {
    match p {
        Some(p) => format!("p(real)={p:.4}"),
        None => "p(real)=n/a".to_string(),
    }
}

fn format_percent(fraction: f64) -> String {
    format!("{:>6.2}%", fraction * 100.0)
}
