//! Rendering of the run result
//!
//! Successful runs publish `out`, `version` and `browser_download_url` as
//! `key=value` lines; failed runs publish nothing but the message.

use crate::error::FetchError;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub out: PathBuf,
    pub version: String,
    pub browser_download_url: Option<String>,
}

impl Outcome {
    pub fn outputs(&self) -> Vec<(&'static str, String)> {
        let mut outputs = vec![
            ("out", self.out.display().to_string()),
            ("version", self.version.clone()),
        ];
        if let Some(url) = &self.browser_download_url {
            outputs.push(("browser_download_url", url.clone()));
        }
        outputs
    }

    /// Print the outputs and append them to `output_file` when given.
    pub fn emit(&self, output_file: Option<&Path>) -> Result<()> {
        let lines: String = self
            .outputs()
            .into_iter()
            .map(|(key, value)| format!("{}={}\n", key, value))
            .collect();

        // Nothing reaches stdout unless the output file took every line
        if let Some(path) = output_file {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Could not open output file {}", path.display()))?;
            file.write_all(lines.as_bytes())
                .with_context(|| format!("Could not write outputs to {}", path.display()))?;
        }

        print!("{}", lines);
        Ok(())
    }
}

/// Log a failed run: the hint (if any) as a warning, then the error.
pub fn report_failure(err: &FetchError, annotate: bool) {
    if let Some(hint) = err.hint() {
        tracing::warn!("{}", hint);
        if annotate {
            println!("::warning::{}", escape_annotation(hint));
        }
    }

    tracing::error!("{}", err);
    if annotate {
        println!("::error::{}", escape_annotation(&err.to_string()));
    }
}

fn escape_annotation(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
