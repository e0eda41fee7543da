//! Comparison table and JSON record rendering.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use approx_sets::compare::{Comparison, Measurement};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};

pub const TEXT_FILE: &str = "comparison_results.txt";
pub const JSON_FILE: &str = "comparison_results.json";

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Exact Count")]
    exact: String,
    #[tabled(rename = "HyperLogLog")]
    hyperloglog: String,
}

/// Render comparison as a markdown table
pub fn table(comparison: &Comparison) -> String {
    let rows = vec![
        Row {
            metric: "Unique Elements",
            exact: format!("{}", comparison.exact.unique_elements),
            hyperloglog: format!("{}", round(comparison.hyperloglog.unique_elements, 2)),
        },
        Row {
            metric: "Execution Time (sec)",
            exact: format!("{}", round(comparison.exact.time_seconds, 4)),
            hyperloglog: format!("{}", round(comparison.hyperloglog.time_seconds, 4)),
        },
    ];

    let table_config = Settings::default().with(Style::markdown());
    Table::new(rows).with(table_config).to_string()
}

/// Render comparison as a JSON record indented by four spaces,
/// with estimates rounded to 2 and timings to 4 decimals
pub fn to_json(comparison: &Comparison) -> Result<String> {
    let rounded = Comparison {
        exact: Measurement {
            unique_elements: comparison.exact.unique_elements,
            time_seconds: round(comparison.exact.time_seconds, 4),
        },
        hyperloglog: Measurement {
            unique_elements: round(comparison.hyperloglog.unique_elements, 2),
            time_seconds: round(comparison.hyperloglog.time_seconds, 4),
        },
    };

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    rounded
        .serialize(&mut serializer)
        .context("serializing comparison")?;
    Ok(String::from_utf8(buf)?)
}

/// Save table and JSON record into `dir`
pub fn save(comparison: &Comparison, table: &str, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let text_path = dir.join(TEXT_FILE);
    fs::write(&text_path, format!("Comparison Results:\n{table}"))
        .with_context(|| format!("writing {}", text_path.display()))?;

    let json_path = dir.join(JSON_FILE);
    fs::write(&json_path, to_json(comparison)?)
        .with_context(|| format!("writing {}", json_path.display()))?;
    Ok(())
}

fn round(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison() -> Comparison {
        Comparison {
            exact: Measurement {
                unique_elements: 1234,
                time_seconds: 0.012345,
            },
            hyperloglog: Measurement {
                unique_elements: 1240.4567,
                time_seconds: 0.00051,
            },
        }
    }

    #[test]
    fn test_table() {
        assert_eq!(
            table(&comparison()),
            [
                "| Metric               | Exact Count | HyperLogLog |",
                "|----------------------|-------------|-------------|",
                "| Unique Elements      | 1234        | 1240.46     |",
                "| Execution Time (sec) | 0.0123      | 0.0005      |",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_json() {
        let json = to_json(&comparison()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["exact"]["unique_elements"], 1234);
        assert!(json.contains("\"unique_elements\": 1234,"));
        assert_eq!(value["exact"]["time_seconds"], 0.0123);
        assert_eq!(value["hyperloglog"]["unique_elements"], 1240.46);
        assert_eq!(value["hyperloglog"]["time_seconds"], 0.0005);
        assert!(json.contains("\n    \"exact\": {\n        \"unique_elements\""));
    }

    #[test]
    fn test_save() {
        let dir = std::env::temp_dir().join(format!("approx-sets-report-{}", std::process::id()));
        save(&comparison(), &table(&comparison()), &dir).unwrap();
        let text = fs::read_to_string(dir.join(TEXT_FILE)).unwrap();
        assert!(text.starts_with("Comparison Results:\n| Metric"));
        assert!(dir.join(JSON_FILE).exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
