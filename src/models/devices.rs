use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Device family the provisioner is allowed to target
pub const SWITCH_FAMILY: &str = "Switches and Hubs";

/// Physical port name, ordered by its numbers (`1/0/2` before `1/0/10`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortName(String);

impl PortName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interface type, then each slot/module/port number in turn
    fn sort_key(&self) -> (&str, Vec<u64>) {
        let split = self.0.find(|c: char| c.is_ascii_digit()).unwrap_or(self.0.len());
        let (kind, numbers) = self.0.split_at(split);
        let numbers = numbers
            .split(|c: char| !c.is_ascii_digit())
            .filter_map(|n| n.parse().ok())
            .collect();
        (kind, numbers)
    }
}

impl Ord for PortName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for PortName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for PortName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for PortName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical port name -> controller interface id, in port order
pub type InterfaceMap = BTreeMap<PortName, String>;

/// Devices found by the last search, keyed by management IP
pub type DeviceInventory = BTreeMap<String, DeviceRecord>;

/// DeviceRecord is a managed switch as reported by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub management_ip: String,
    /// Controller-assigned instance UUID; deployments address the device by this
    pub id: String,
    pub hostname: String,
    pub platform: String,
    pub software_version: String,
    pub reachability: String,
    pub family: String,
    pub series: String,
    pub last_update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Loaded lazily the first time the device's provisioning view is opened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<InterfaceMap>,
}

/// DeviceSearchRequest filters devices by hostname (case sensitive)
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSearchRequest {
    #[serde(default)]
    pub filter: String,
}

/// SelectDeviceRequest picks the provisioning target
#[derive(Debug, Clone, Deserialize)]
pub struct SelectDeviceRequest {
    pub management_ip: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_sort_by_number() {
        let mut ports: Vec<PortName> = [
            "GigabitEthernet2/0/1",
            "GigabitEthernet1/0/10",
            "GigabitEthernet1/0/2",
            "GigabitEthernet1/0/48",
            "GigabitEthernet1/0/1",
        ]
        .into_iter()
        .map(PortName::from)
        .collect();
        ports.sort();

        let names: Vec<&str> = ports.iter().map(PortName::as_str).collect();
        assert_eq!(
            names,
            [
                "GigabitEthernet1/0/1",
                "GigabitEthernet1/0/2",
                "GigabitEthernet1/0/10",
                "GigabitEthernet1/0/48",
                "GigabitEthernet2/0/1",
            ]
        );
    }

    #[test]
    fn test_interface_map_serializes_in_port_order() {
        let map: InterfaceMap = [("GigabitEthernet1/0/10", "b"), ("GigabitEthernet1/0/9", "a")]
            .into_iter()
            .map(|(name, id)| (PortName::from(name), id.to_string()))
            .collect();

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"GigabitEthernet1/0/9":"a","GigabitEthernet1/0/10":"b"}"#);

        let back: InterfaceMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_leading_zeros_stay_distinct() {
        let a = PortName::from("GigabitEthernet1/0/01");
        let b = PortName::from("GigabitEthernet1/0/1");
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }
}
