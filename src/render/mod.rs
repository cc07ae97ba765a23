use std::path::Path;
use std::sync::OnceLock;

use tera::{Context, Tera};

use crate::models::{InterfaceMap, PortName, VlanEntry};

/// Separator between rendered statements, mimicking IOS config `!` lines
pub const STATEMENT_SEPARATOR: &str = "\n!\n";

pub const VLAN_TEMPLATE: &str = "vlan";
pub const PORT_TEMPLATE: &str = "port";

const DEFAULT_VLAN_TEMPLATE: &str = "vlan {{ vlan_id }}\n name {{ vlan_name }}";
const DEFAULT_PORT_TEMPLATE: &str = "interface {{ interface_name }}\n switchport access vlan {{ vlan_id }}";

/// Rejected form input. Nothing is rendered when any row is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one VLAN is required")]
    Empty,
    #[error("row {row}: VLAN ID must be a number between 1 and 4094, got '{value}'")]
    InvalidVlanId { row: usize, value: String },
    #[error("row {row}: VLAN name can only contain alphanumeric characters, dashes, or underscores")]
    InvalidVlanName { row: usize, value: String },
    #[error("row {row}: cannot apply VLAN with no ports assigned")]
    NoPorts { row: usize },
    #[error("row {row}: port '{port}' is not an assignable port on this device")]
    UnknownPort { row: usize, port: String },
    #[error("template rendering failed: {0}")]
    Render(String),
}

/// A form row after validation
#[derive(Debug, Clone, PartialEq)]
struct ValidVlan {
    id: u16,
    name: String,
    ports: Vec<String>,
}

fn vlan_name_re() -> &'static regex_lite::Regex {
    static RE: OnceLock<regex_lite::Regex> = OnceLock::new();
    RE.get_or_init(|| regex_lite::Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"))
}

/// Port names of one row, one per non-blank line
fn port_names(entry: &VlanEntry) -> impl Iterator<Item = &str> {
    entry.ports.lines().map(str::trim).filter(|p| !p.is_empty())
}

/// Every submitted port must be one the device offers for assignment
pub fn check_ports(entries: &[VlanEntry], ports: &InterfaceMap) -> Result<(), ValidationError> {
    for (i, entry) in entries.iter().enumerate() {
        if let Some(port) = port_names(entry).find(|p| !ports.contains_key(&PortName::from(*p))) {
            return Err(ValidationError::UnknownPort {
                row: i + 1,
                port: port.to_string(),
            });
        }
    }
    Ok(())
}

fn validate(entries: &[VlanEntry]) -> Result<Vec<ValidVlan>, ValidationError> {
    if entries.is_empty() {
        return Err(ValidationError::Empty);
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let row = i + 1;

            let id = entry
                .vlan_id
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|id| (1..=4094).contains(id))
                .ok_or_else(|| ValidationError::InvalidVlanId {
                    row,
                    value: entry.vlan_id.clone(),
                })?;

            let name = entry.vlan_name.trim();
            if !vlan_name_re().is_match(name) {
                return Err(ValidationError::InvalidVlanName {
                    row,
                    value: entry.vlan_name.clone(),
                });
            }

            let ports: Vec<String> = port_names(entry).map(str::to_string).collect();
            if ports.is_empty() {
                return Err(ValidationError::NoPorts { row });
            }

            Ok(ValidVlan {
                id,
                name: name.to_string(),
                ports,
            })
        })
        .collect()
}

/// ConfigRenderer turns VLAN form rows into template payload text.
///
/// Holds the two statement templates (`vlan` and `port`); rendering itself
/// touches nothing outside this struct.
pub struct ConfigRenderer {
    tera: Tera,
}

impl ConfigRenderer {
    /// Renderer with the built-in IOS-XE statements
    #[cfg(test)]
    pub fn new() -> Result<Self, tera::Error> {
        Self::with_templates(DEFAULT_VLAN_TEMPLATE, DEFAULT_PORT_TEMPLATE)
    }

    pub fn with_templates(vlan: &str, port: &str) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(VLAN_TEMPLATE, vlan)?;
        tera.add_raw_template(PORT_TEMPLATE, port)?;
        Ok(Self { tera })
    }

    /// Load `vlan.tera` / `port.tera` from a directory, falling back to the
    /// built-in statement for any file that is missing.
    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let load = |file: &str, default: &str| -> anyhow::Result<String> {
            let path = dir.join(file);
            if path.is_file() {
                tracing::info!("Using config template {}", path.display());
                Ok(std::fs::read_to_string(&path)?.trim_end().to_string())
            } else {
                Ok(default.to_string())
            }
        };

        let vlan = load("vlan.tera", DEFAULT_VLAN_TEMPLATE)?;
        let port = load("port.tera", DEFAULT_PORT_TEMPLATE)?;
        Ok(Self::with_templates(&vlan, &port)?)
    }

    /// Render the full payload: every VLAN definition first, then every port
    /// assignment, statements joined by [`STATEMENT_SEPARATOR`].
    pub fn render(&self, entries: &[VlanEntry]) -> Result<String, ValidationError> {
        let vlans = validate(entries)?;

        let mut vlan_config = Vec::with_capacity(vlans.len());
        let mut port_config = Vec::new();

        for vlan in &vlans {
            let mut context = Context::new();
            context.insert("vlan_id", &vlan.id);
            context.insert("vlan_name", &vlan.name);
            vlan_config.push(self.render_one(VLAN_TEMPLATE, &context)?);

            for port in &vlan.ports {
                let mut context = Context::new();
                context.insert("interface_name", port);
                context.insert("vlan_id", &vlan.id);
                port_config.push(self.render_one(PORT_TEMPLATE, &context)?);
            }
        }

        vlan_config.extend(port_config);
        Ok(vlan_config.join(STATEMENT_SEPARATOR))
    }

    fn render_one(&self, name: &str, context: &Context) -> Result<String, ValidationError> {
        self.tera
            .render(name, context)
            .map_err(|e| ValidationError::Render(e.to_string()))
    }
}
