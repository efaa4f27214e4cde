// src/deploy/compose.rs
// DOCUMENTATION: Container topology descriptor (docker-compose)
// PURPOSE: Parse infra/docker-compose.yml and check startup order and volume declarations

use super::graph::{topological_order, GraphError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("cannot read compose file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid compose file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported compose file version '{0}'")]
    UnsupportedVersion(String),

    #[error("compose file declares no services")]
    NoServices,

    #[error("service '{0}' has neither image nor build")]
    MissingImage(String),

    #[error("service '{service}' publishes invalid port '{port}'")]
    InvalidPort { service: String, port: String },

    #[error("service '{service}' mounts undeclared volume '{volume}'")]
    UndeclaredVolume { service: String, volume: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// `depends_on` accepts a list of names or a map of name to condition
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    List(Vec<String>),
    Map(BTreeMap<String, serde_yaml::Value>),
}

impl Default for DependsOn {
    fn default() -> Self {
        DependsOn::List(Vec::new())
    }
}

impl DependsOn {
    pub fn names(&self) -> Vec<String> {
        match self {
            DependsOn::List(names) => names.clone(),
            DependsOn::Map(map) => map.keys().cloned().collect(),
        }
    }
}

/// `env_file` may be a single path or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnvFile {
    One(String),
    Many(Vec<String>),
}

impl EnvFile {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            EnvFile::One(path) => vec![path.as_str()],
            EnvFile::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// A volume entry, short (`source:target[:mode]`) or long syntax
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VolumeMount {
    Short(String),
    Long {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        source: Option<String>,
        target: String,
    },
}

impl VolumeMount {
    /// Name of the named volume this mount uses, if any
    /// Bind mounts (host paths) and anonymous volumes yield `None`
    pub fn named_volume(&self) -> Option<&str> {
        let source = match self {
            VolumeMount::Short(spec) => match spec.split_once(':') {
                Some((source, _)) => source,
                None => return None,
            },
            VolumeMount::Long { kind, source, .. } => {
                if kind.as_deref().map_or(false, |k| k != "volume") {
                    return None;
                }
                source.as_deref()?
            }
        };

        if is_host_path(source) {
            None
        } else {
            Some(source)
        }
    }
}

fn is_host_path(source: &str) -> bool {
    source.starts_with('.') || source.starts_with('/') || source.starts_with('~')
}

/// A `ports` entry: short string, bare container port, or long syntax
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortMapping {
    Bare(u64),
    Short(String),
    Long {
        target: u64,
        #[serde(default)]
        published: Option<serde_yaml::Value>,
        #[serde(default)]
        protocol: Option<String>,
    },
}

impl PortMapping {
    /// Host port, when the entry publishes one
    pub fn published(&self) -> Option<u16> {
        match self {
            PortMapping::Bare(_) => None,
            PortMapping::Short(spec) => parse_port_mapping(spec).map(|(host, _)| host),
            PortMapping::Long { published, .. } => match published.as_ref()? {
                serde_yaml::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
                serde_yaml::Value::String(s) => s.parse().ok(),
                _ => None,
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            PortMapping::Bare(port) => is_port_number(*port),
            PortMapping::Short(spec) => is_valid_port_spec(spec),
            PortMapping::Long {
                target, published, ..
            } => is_port_number(*target) && (published.is_none() || self.published().is_some()),
        }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortMapping::Bare(port) => write!(f, "{}", port),
            PortMapping::Short(spec) => f.write_str(spec),
            PortMapping::Long {
                target,
                published,
                protocol,
            } => {
                match published {
                    Some(serde_yaml::Value::Number(n)) => write!(f, "{}:", n)?,
                    Some(serde_yaml::Value::String(s)) => write!(f, "{}:", s)?,
                    Some(other) => write!(f, "{:?}:", other)?,
                    None => {}
                }
                write!(f, "{}", target)?;
                if let Some(protocol) = protocol {
                    write!(f, "/{}", protocol)?;
                }
                Ok(())
            }
        }
    }
}

fn is_port_number(port: u64) -> bool {
    (1..=u64::from(u16::MAX)).contains(&port)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub image: Option<String>,
    pub build: Option<serde_yaml::Value>,
    pub restart: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
    #[serde(default)]
    pub volumes: Vec<VolumeMount>,
    pub env_file: Option<EnvFile>,
    #[serde(default)]
    pub depends_on: DependsOn,
}

impl Service {
    /// Host ports published by this service
    pub fn published_ports(&self) -> Vec<u16> {
        self.ports.iter().filter_map(PortMapping::published).collect()
    }
}

/// `HOST:CONTAINER` with an optional `/proto` suffix
fn parse_port_mapping(spec: &str) -> Option<(u16, u16)> {
    let spec = spec.split('/').next()?;
    let mut parts = spec.rsplitn(3, ':');
    let container = parts.next()?.parse().ok()?;
    let host = parts.next()?.parse().ok()?;
    Some((host, container))
}

/// A published mapping or a bare container port
fn is_valid_port_spec(spec: &str) -> bool {
    parse_port_mapping(spec).is_some()
        || spec
            .split('/')
            .next()
            .map_or(false, |port| port.parse::<u16>().is_ok())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComposeFile {
    /// Quoted or bare (`3.8` parses as a number)
    pub version: Option<serde_yaml::Value>,
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
    #[serde(default)]
    pub volumes: BTreeMap<String, Option<serde_yaml::Value>>,
}

impl ComposeFile {
    pub fn parse(source: &str) -> Result<Self, ComposeError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ComposeError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    pub fn version(&self) -> Option<String> {
        match self.version.as_ref()? {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            other => Some(format!("{:?}", other)),
        }
    }

    /// Check the descriptor and return the service startup order
    pub fn validate(&self) -> Result<Vec<String>, ComposeError> {
        if let Some(version) = self.version() {
            if !(version.starts_with('2') || version.starts_with('3')) {
                return Err(ComposeError::UnsupportedVersion(version));
            }
        }

        if self.services.is_empty() {
            return Err(ComposeError::NoServices);
        }

        for (name, service) in &self.services {
            if service.image.is_none() && service.build.is_none() {
                return Err(ComposeError::MissingImage(name.clone()));
            }

            for port in &service.ports {
                if !port.is_valid() {
                    return Err(ComposeError::InvalidPort {
                        service: name.clone(),
                        port: port.to_string(),
                    });
                }
            }

            for mount in &service.volumes {
                if let Some(volume) = mount.named_volume() {
                    if !self.volumes.contains_key(volume) {
                        return Err(ComposeError::UndeclaredVolume {
                            service: name.clone(),
                            volume: volume.to_string(),
                        });
                    }
                }
            }
        }

        self.startup_order()
    }

    /// Services ordered so each starts after its `depends_on`
    pub fn startup_order(&self) -> Result<Vec<String>, ComposeError> {
        let nodes: Vec<String> = self.services.keys().cloned().collect();
        let edges: Vec<(String, String)> = self
            .services
            .iter()
            .flat_map(|(name, service)| {
                service
                    .depends_on
                    .names()
                    .into_iter()
                    .map(move |dep| (name.clone(), dep))
            })
            .collect();

        Ok(topological_order(&nodes, &edges)?)
    }
}
