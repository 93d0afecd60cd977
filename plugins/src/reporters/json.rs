//! Writes results as a timestamped JSON document.

use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;

use meshprobe_common::capability::{ConfigMap, Reporter};
use meshprobe_common::config;
use meshprobe_common::model::ExecutionResult;

pub const NAME: &str = "JSONReporter";

const DEFAULT_OUTPUT: &str = "report.json";

pub struct JsonReporter {
    output_file: PathBuf,
}

pub fn factory(config: &ConfigMap) -> anyhow::Result<Box<dyn Reporter>> {
    Ok(Box::new(JsonReporter {
        output_file: PathBuf::from(config::str_or(config, "output_file", DEFAULT_OUTPUT)),
    }))
}

impl Reporter for JsonReporter {
    fn report(&self, results: &[ExecutionResult]) -> anyhow::Result<()> {
        let report = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "results": results,
        });
        let file = File::create(&self.output_file).with_context(|| {
            format!(
                "error writing JSON report to '{}'",
                self.output_file.display()
            )
        })?;
        serde_json::to_writer_pretty(file, &report)
            .with_context(|| format!("error writing JSON report to '{}'", self.output_file.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_results_under_a_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let reporter = JsonReporter {
            output_file: path.clone(),
        };

        let results = vec![ExecutionResult {
            node: "n1".into(),
            interface: "aa:bb:cc:dd:ee:01".into(),
            success: true,
            metric: Some(0.42),
        }];
        reporter.report(&results).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written["timestamp"].is_string());
        assert_eq!(written["results"][0]["node"], "n1");
        assert_eq!(written["results"][0]["metric"], 0.42);
    }

    #[test]
    fn absent_metric_is_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let reporter = JsonReporter {
            output_file: path.clone(),
        };

        reporter
            .report_one(&ExecutionResult {
                node: "n1".into(),
                interface: "aa:bb:cc:dd:ee:01".into(),
                success: false,
                metric: None,
            })
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written["results"][0].get("metric").is_none());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let reporter = JsonReporter {
            output_file: PathBuf::from("/nonexistent-dir/out.json"),
        };
        assert!(reporter.report(&[]).is_err());
    }
}
