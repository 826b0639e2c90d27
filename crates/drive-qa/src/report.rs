//! Console report of query results

use console::style;
use std::io::Write;

use crate::types::QueryResult;

/// How a result is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// Score at or above the threshold
    High,
    /// Score below the threshold, or no answer at all
    Low,
}

/// Prints results against a run-wide confidence threshold
pub struct Reporter {
    threshold: f32,
}

impl Reporter {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// High iff the score is at least the threshold
    pub fn classify(&self, result: &QueryResult) -> Confidence {
        if result.meets_threshold(self.threshold) {
            Confidence::High
        } else {
            Confidence::Low
        }
    }

    /// Write one block per result, in order
    pub fn write_report<W: Write>(&self, out: &mut W, results: &[QueryResult]) -> std::io::Result<()> {
        for result in results {
            self.write_result(out, result)?;
        }
        out.flush()
    }

    fn write_result<W: Write>(&self, out: &mut W, result: &QueryResult) -> std::io::Result<()> {
        writeln!(out, "{}", style(&result.question).green().bright())?;

        let Some(answer) = &result.answer else {
            writeln!(out, "{}", style("   No answer could be produced for this question.").red())?;
            return Ok(());
        };
        let confidence = format!("   Confidence Level: {:.2}%", answer.score * 100.0);

        match self.classify(result) {
            Confidence::High => {
                writeln!(out, "{}", style(format!("   Answer: {}", answer.text)).cyan())?;
                writeln!(out, "{}", style(confidence).cyan())?;
            }
            Confidence::Low => {
                writeln!(out, "{}", style(format!("   Answer: {}", answer.text)).red())?;
                writeln!(
                    out,
                    "{}",
                    style("   This answer does not meet the threshold, use it at your own risk!").red()
                )?;
                writeln!(out, "{}", style(confidence).red())?;
            }
        }
        Ok(())
    }
}
