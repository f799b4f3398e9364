use crate::ExpError;
use prettytable::{format, row, Table};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Throughput of a single host, derived from its latency samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Throughput {
    pub host: String,
    pub ops_per_sec: f64,
}

/// Computes ops/sec from latency samples in milliseconds:
/// `count / (sum / 1000)`. `None` when there are no samples.
pub fn ops_per_sec(latencies_ms: &[f64]) -> Option<f64> {
    if latencies_ms.is_empty() {
        return None;
    }
    let total_ms: f64 = latencies_ms.iter().sum();
    Some(latencies_ms.len() as f64 / (total_ms / 1000.0))
}

/// Reads one latency file (one float millisecond value per line, blank lines
/// skipped) and computes the host's throughput. The host label is the file's
/// parent directory name, per the `<dir>/<hostname>/latency[-<suffix>]`
/// convention.
pub fn from_file(path: impl AsRef<Path>) -> Result<Throughput, ExpError> {
    let path = path.as_ref();
    let unreadable = |reason: String| ExpError::InputUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|err| unreadable(err.to_string()))?;
    let mut latencies = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|err| unreadable(err.to_string()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = line.parse().map_err(|_| {
            unreadable(format!("invalid latency value '{}'", line))
        })?;
        latencies.push(value);
    }

    // an empty sample set has no throughput
    let ops_per_sec = ops_per_sec(&latencies)
        .ok_or_else(|| unreadable("no latency samples".to_string()))?;
    Ok(Throughput {
        host: host_label(path),
        ops_per_sec,
    })
}

fn host_label(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sorts descending by ops/sec and appends an `average` row with the
/// arithmetic mean of the per-host values (mean over hosts, not over
/// samples). Empty input stays empty.
pub fn ranked(mut rows: Vec<Throughput>) -> Vec<Throughput> {
    rows.sort_by(|a, b| b.ops_per_sec.total_cmp(&a.ops_per_sec));
    if !rows.is_empty() {
        let mean = rows.iter().map(|row| row.ops_per_sec).sum::<f64>()
            / rows.len() as f64;
        rows.push(Throughput {
            host: "average".to_string(),
            ops_per_sec: mean,
        });
    }
    rows
}

/// Renders rows as a plain two-column table: header, dashed rule, one line
/// per row, no borders.
pub fn table(rows: &[Throughput]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["host", r->"ops/sec"]);
    for tput in rows {
        table.add_row(row![tput.host, r->format!("{:.2}", tput.ops_per_sec)]);
    }
    table
}
