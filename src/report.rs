//! Fitness-history reporting.
//!
//! The engine's only obligation is to keep the history complete and
//! ordered; this module turns it into a terminal chart or a CSV file for
//! external tooling.

use crate::error::EvolutionError;
use crate::population::GenerationStats;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CHART_WIDTH: usize = 50;

/// Write the history as `generation,max_fitness,avg_fitness` rows.
pub fn write_csv<P: AsRef<Path>>(path: P, history: &[GenerationStats]) -> Result<(), EvolutionError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "generation,max_fitness,avg_fitness")?;
    for (generation, stats) in history.iter().enumerate() {
        writeln!(
            writer,
            "{},{:.6},{:.6}",
            generation, stats.max_fitness, stats.avg_fitness
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Render the history as a fixed-width text chart, one row per generation.
///
/// `#` marks the max-fitness bar, `-` extends from the average to the max.
pub fn render(history: &[GenerationStats]) -> String {
    let mut out = String::new();
    out.push_str("  gen      max      avg\n");

    let scale = history
        .iter()
        .map(|s| s.max_fitness)
        .fold(f32::EPSILON, f32::max);

    for (generation, stats) in history.iter().enumerate() {
        let max_bar = (stats.max_fitness / scale * CHART_WIDTH as f32).round() as usize;
        let avg_bar = (stats.avg_fitness / scale * CHART_WIDTH as f32).round() as usize;
        let avg_bar = avg_bar.min(max_bar);

        out.push_str(&format!(
            "{:5}   {:.4}   {:.4}  {}{}\n",
            generation,
            stats.max_fitness,
            stats.avg_fitness,
            "#".repeat(avg_bar),
            "-".repeat(max_bar - avg_bar),
        ));
    }
    out
}
