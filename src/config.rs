use crate::hosts::{Host, Region};
use crate::ExpError;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

// FIXED: every replica listens on the same ports
pub const PORT: usize = 3264;
pub const HTTP_PORT: usize = 3265;

/// One generated configuration document, tagged with the `(size, conflicts)`
/// pair it was generated for so that callers can name the output file.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedConfig {
    size: usize,
    conflicts: i64,
    config: Value,
}

impl GeneratedConfig {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn conflicts(&self) -> i64 {
        self.conflicts
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    /// File name under which callers store this document.
    pub fn file_name(&self) -> String {
        format!("config-{}-{}.json", self.size, self.conflicts)
    }
}

/// Fans the base config out into one document per `(size, conflicts)` pair,
/// sizes outer and conflicts inner. Each document gets fresh `address` and
/// `http_address` maps and `benchmark.Conflicts` set; every other base field
/// passes through untouched.
///
/// Replica `i` is placed round-robin over the sorted region ids, and the
/// replica identifier is `"{region_ordinal}.{local_id}"` with a 1-based
/// ordinal, so identifiers are stable across runs for an unchanged registry.
///
/// Known limitation: placement always takes a region's *first* host, so when
/// `size` exceeds the region count the wrap re-selects the same physical
/// host instead of spreading over the region's remaining hosts.
pub fn generate(
    base: &Value,
    grouping: &HashMap<Region, Vec<Host>>,
    region_ids: &[Region],
    sizes: &[usize],
    conflicts: &[i64],
) -> Result<Vec<GeneratedConfig>, ExpError> {
    let base = base
        .as_object()
        .filter(|base| base.get("benchmark").map_or(false, Value::is_object))
        .ok_or(ExpError::MissingBenchmarkSection)?;

    // region ids must be exactly the grouping's key set (no duplicates: a
    // repeated id would hand one region another region's ordinal), and a
    // region with no hosts cannot be placed on
    let distinct: HashSet<_> = region_ids.iter().collect();
    let consistent = distinct.len() == region_ids.len()
        && region_ids.len() == grouping.len()
        && region_ids.iter().all(|region| {
            grouping.get(region).map_or(false, |hosts| !hosts.is_empty())
        });
    if !consistent {
        return Err(ExpError::InconsistentTopology);
    }
    if region_ids.is_empty() {
        return Err(ExpError::EmptyRegionSet);
    }

    let mut configs = Vec::with_capacity(sizes.len() * conflicts.len());
    for &size in sizes {
        for &conflict in conflicts {
            let mut address = Map::new();
            let mut http_address = Map::new();

            for i in 0..size {
                let index = i % region_ids.len();
                let region = &region_ids[index];
                // TODO: round-robin within the region instead of always
                // taking its first host
                let host = &grouping[region][0];
                let replica_id = format!("{}.{}", index + 1, host.local_id());
                address.insert(
                    replica_id.clone(),
                    json!(format!("{}:{}", host.hostname(), PORT)),
                );
                http_address.insert(
                    replica_id,
                    json!(format!("http://{}:{}", host.hostname(), HTTP_PORT)),
                );
            }

            let mut config = base.clone();
            config.insert("address".to_string(), Value::Object(address));
            config
                .insert("http_address".to_string(), Value::Object(http_address));
            if let Some(Value::Object(benchmark)) = config.get_mut("benchmark")
            {
                benchmark.insert("Conflicts".to_string(), json!(conflict));
            }

            configs.push(GeneratedConfig {
                size,
                conflicts: conflict,
                config: Value::Object(config),
            });
        }
    }
    tracing::debug!(
        "generated {} configs for {} regions",
        configs.len(),
        region_ids.len()
    );
    Ok(configs)
}

/// Returns the number of clients (out of `n`) that the host at `index`
/// should run, allocating evenly in a round-robin fashion. For example, with
/// `host_count = 3` and `n = 5` this returns 2 for host 0, 2 for host 1 and
/// 1 for host 2. `host_count` must be nonzero.
pub fn round_robin(n: usize, index: usize, host_count: usize) -> usize {
    let mut num = n / host_count;
    if index < n % host_count {
        num += 1;
    }
    num
}
