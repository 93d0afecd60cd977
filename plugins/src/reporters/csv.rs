//! Writes results as a flat CSV table, one row per result.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use meshprobe_common::capability::{ConfigMap, Reporter};
use meshprobe_common::config;
use meshprobe_common::model::ExecutionResult;

pub const NAME: &str = "CSVReporter";

const DEFAULT_OUTPUT: &str = "report.csv";
const HEADER: &str = "timestamp,node,interface,success,metric";

pub struct CsvReporter {
    output_file: PathBuf,
}

pub fn factory(config: &ConfigMap) -> anyhow::Result<Box<dyn Reporter>> {
    Ok(Box::new(CsvReporter {
        output_file: PathBuf::from(config::str_or(config, "output_file", DEFAULT_OUTPUT)),
    }))
}

impl Reporter for CsvReporter {
    fn report(&self, results: &[ExecutionResult]) -> anyhow::Result<()> {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let mut out = String::from(HEADER);
        out.push('\n');
        for result in results {
            let metric = result.metric.map(|m| m.to_string()).unwrap_or_default();
            let _ = writeln!(
                out,
                "{timestamp},{},{},{},{metric}",
                result.node, result.interface, result.success
            );
        }
        fs::write(&self.output_file, out).with_context(|| {
            format!(
                "error writing CSV report to '{}'",
                self.output_file.display()
            )
        })
    }
}
