use crate::ExpError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(
    Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Deserialize, Serialize,
)]
pub struct Region {
    name: String,
}

impl Region {
    /// Create a new `Region`.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Region { name: name.into() }
    }

    pub fn name(&self) -> &String {
        &self.name
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One machine in the fleet. The region and local id are derived from the
/// logical name, never stored in the registry document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Host {
    logical_name: String,
    hostname: String,
    region: Region,
    local_id: u64,
}

impl Host {
    /// Creates a `Host` from a registry entry, deriving `(region, local_id)`
    /// from the logical name: the name is split on hyphens, the region is
    /// every segment between the first and the last (joined with a single
    /// space, possibly empty), and the local id is the trailing segment
    /// parsed as an integer.
    pub fn from_entry(
        logical_name: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Result<Self, ExpError> {
        let logical_name = logical_name.into();
        // split always yields at least one segment
        let segments: Vec<&str> = logical_name.split('-').collect();
        let local_id = match segments[segments.len() - 1].parse() {
            Ok(id) => id,
            Err(_) => {
                return Err(ExpError::MalformedHostName(logical_name))
            }
        };
        let region = if segments.len() > 2 {
            segments[1..segments.len() - 1].join(" ")
        } else {
            String::new()
        };
        Ok(Self {
            logical_name,
            hostname: hostname.into(),
            region: Region::new(region),
            local_id,
        })
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn local_id(&self) -> u64 {
        self.local_id
    }
}

/// Loads hosts from a registry document mapping logical host name to an
/// object with at least a `hostname` field. Document order is preserved.
pub fn load(document: &Value) -> Result<Vec<Host>, ExpError> {
    let entries = document.as_object().ok_or(ExpError::MalformedRegistry)?;
    let entries = entries
        .iter()
        .map(|(logical_name, info)| {
            let hostname = info
                .get("hostname")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ExpError::MissingHostname(logical_name.clone())
                })?;
            Ok((logical_name.clone(), hostname.to_string()))
        })
        .collect::<Result<Vec<_>, ExpError>>()?;
    from_entries(entries)
}

/// Creates hosts from `(logical_name, hostname)` pairs, rejecting duplicate
/// logical names.
pub fn from_entries<I>(entries: I) -> Result<Vec<Host>, ExpError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut seen = HashSet::new();
    let mut hosts = Vec::new();
    for (logical_name, hostname) in entries {
        if !seen.insert(logical_name.clone()) {
            return Err(ExpError::DuplicateHostName(logical_name));
        }
        hosts.push(Host::from_entry(logical_name, hostname)?);
    }
    tracing::debug!("loaded {} hosts", hosts.len());
    Ok(hosts)
}

/// Groups hosts by region. Per-region order is the order hosts were
/// encountered while scanning the registry.
pub fn group_by_region(hosts: &[Host]) -> HashMap<Region, Vec<Host>> {
    let mut grouping: HashMap<Region, Vec<Host>> = HashMap::new();
    for host in hosts {
        grouping
            .entry(host.region().clone())
            .or_default()
            .push(host.clone());
    }
    grouping
}

/// Region names sorted lexicographically ascending. This ordering defines
/// the region ordinal used in replica identifiers, so adding or removing a
/// region renumbers unrelated regions: callers must regenerate every config
/// when the registry changes, not just the ones for affected regions.
pub fn sorted_region_ids(grouping: &HashMap<Region, Vec<Host>>) -> Vec<Region> {
    let mut region_ids: Vec<_> = grouping.keys().cloned().collect();
    region_ids.sort();
    region_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use serde_json::json;

    #[test]
    fn host_name_parsing() {
        let host = Host::from_entry("dc1-useast-1", "h1").unwrap();
        assert_eq!(host.region(), &Region::new("useast"));
        assert_eq!(host.local_id(), 1);

        // middle segments are joined with a single space
        let host = Host::from_entry("dc1-us-east-12", "h2").unwrap();
        assert_eq!(host.region(), &Region::new("us east"));
        assert_eq!(host.local_id(), 12);

        // two-segment names have an empty region
        let host = Host::from_entry("dc1-3", "h3").unwrap();
        assert_eq!(host.region(), &Region::new(""));
        assert_eq!(host.local_id(), 3);
    }

    #[test]
    fn malformed_host_name() {
        assert_eq!(
            Host::from_entry("dc1-useast-x", "h1"),
            Err(ExpError::MalformedHostName("dc1-useast-x".to_string()))
        );
        assert_eq!(
            Host::from_entry("useast", "h1"),
            Err(ExpError::MalformedHostName("useast".to_string()))
        );
    }

    #[quickcheck]
    fn name_derivation(region_index: u8, local_id: u32) -> bool {
        const REGIONS: [&str; 4] = ["useast", "uswest", "eucentral", "apsouth"];
        let region = REGIONS[region_index as usize % REGIONS.len()];
        let name = format!("dc1-{}-{}", region, local_id);
        let host = Host::from_entry(name, "h").unwrap();
        host.region() == &Region::new(region)
            && host.local_id() == u64::from(local_id)
    }

    #[test]
    fn duplicate_host_name() {
        let entries = vec![
            ("dc1-east-1".to_string(), "h1".to_string()),
            ("dc1-east-1".to_string(), "h2".to_string()),
        ];
        assert_eq!(
            from_entries(entries),
            Err(ExpError::DuplicateHostName("dc1-east-1".to_string()))
        );
    }

    #[test]
    fn load_rejects_bad_documents() {
        assert_eq!(load(&json!([])), Err(ExpError::MalformedRegistry));
        assert_eq!(
            load(&json!({"dc1-east-1": {}})),
            Err(ExpError::MissingHostname("dc1-east-1".to_string()))
        );
    }

    #[test]
    fn load_groups_and_sorts() {
        let registry = json!({
            "dc1-east-1": {"hostname": "h1"},
            "dc1-west-1": {"hostname": "h2"},
            "dc1-east-2": {"hostname": "h3"},
        });
        let hosts = load(&registry).unwrap();

        // document order is preserved
        let names: Vec<_> =
            hosts.iter().map(|host| host.logical_name()).collect();
        assert_eq!(names, vec!["dc1-east-1", "dc1-west-1", "dc1-east-2"]);

        let grouping = group_by_region(&hosts);
        assert_eq!(grouping.len(), 2);
        let east: Vec<_> = grouping[&Region::new("east")]
            .iter()
            .map(|host| host.logical_name())
            .collect();
        assert_eq!(east, vec!["dc1-east-1", "dc1-east-2"]);
        let west: Vec<_> = grouping[&Region::new("west")]
            .iter()
            .map(|host| host.logical_name())
            .collect();
        assert_eq!(west, vec!["dc1-west-1"]);

        assert_eq!(
            sorted_region_ids(&grouping),
            vec![Region::new("east"), Region::new("west")]
        );
    }

    #[test]
    fn per_region_order_follows_document_order() {
        // east-2 comes first in the document, so it comes first in the group
        let registry = json!({
            "dc1-east-2": {"hostname": "h3"},
            "dc1-east-1": {"hostname": "h1"},
        });
        let hosts = load(&registry).unwrap();
        let grouping = group_by_region(&hosts);
        let east: Vec<_> = grouping[&Region::new("east")]
            .iter()
            .map(|host| host.logical_name())
            .collect();
        assert_eq!(east, vec!["dc1-east-2", "dc1-east-1"]);
    }
}
