// src/deploy/workflow.rs
// DOCUMENTATION: CI/CD pipeline descriptor (GitHub Actions)
// PURPOSE: Parse the workflow, order its jobs and check the stages gate each other

use super::graph::{topological_order, GraphError};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("cannot read workflow file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid workflow file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("workflow declares no jobs")]
    NoJobs,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// `needs` is either a single job id or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Needs {
    One(String),
    Many(Vec<String>),
}

impl Default for Needs {
    fn default() -> Self {
        Needs::Many(Vec::new())
    }
}

impl Needs {
    pub fn names(&self) -> Vec<String> {
        match self {
            Needs::One(name) => vec![name.clone()],
            Needs::Many(names) => names.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub name: Option<String>,
    pub uses: Option<String>,
    pub run: Option<String>,
    pub with: Option<serde_yaml::Value>,
    pub env: Option<serde_yaml::Value>,
}

/// `runs-on`: a label, a list of labels, or a runner group
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RunsOn {
    Label(String),
    Labels(Vec<String>),
    Group {
        group: Option<String>,
        #[serde(default)]
        labels: Option<serde_yaml::Value>,
    },
}

impl RunsOn {
    pub fn labels(&self) -> Vec<String> {
        match self {
            RunsOn::Label(label) => vec![label.clone()],
            RunsOn::Labels(labels) => labels.clone(),
            RunsOn::Group { labels, .. } => match labels {
                Some(serde_yaml::Value::String(label)) => vec![label.clone()],
                Some(serde_yaml::Value::Sequence(labels)) => labels
                    .iter()
                    .filter_map(|l| l.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub name: Option<String>,
    #[serde(rename = "runs-on")]
    pub runs_on: Option<RunsOn>,
    #[serde(default)]
    pub needs: Needs,
    #[serde(rename = "if")]
    pub condition: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Job {
    /// A job that runs even when a needed job failed
    /// Any status function other than `success()` drops the implicit success gate
    pub fn runs_after_failure(&self) -> bool {
        const UNGATED: [&str; 3] = ["always()", "failure()", "cancelled()"];

        let condition: String = match self.condition.as_deref() {
            Some(c) => c.chars().filter(|c| !c.is_whitespace()).collect(),
            None => return false,
        };
        UNGATED.iter().any(|f| condition.contains(f))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Workflow {
    pub name: Option<String>,
    #[serde(rename = "on")]
    pub on: serde_yaml::Value,
    pub jobs: BTreeMap<String, Job>,
    #[serde(skip)]
    source: String,
}

impl Workflow {
    pub fn parse(source: &str) -> Result<Self, WorkflowError> {
        let mut workflow: Workflow = serde_yaml::from_str(source)?;
        workflow.source = source.to_string();
        Ok(workflow)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Event names that trigger the workflow
    pub fn triggers(&self) -> Vec<String> {
        match &self.on {
            serde_yaml::Value::String(event) => vec![event.clone()],
            serde_yaml::Value::Sequence(events) => events
                .iter()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect(),
            serde_yaml::Value::Mapping(events) => events
                .keys()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Check every `needs` target exists and the graph is acyclic
    /// Returns jobs in execution order
    pub fn validate(&self) -> Result<Vec<String>, WorkflowError> {
        if self.jobs.is_empty() {
            return Err(WorkflowError::NoJobs);
        }

        let nodes: Vec<String> = self.jobs.keys().cloned().collect();
        let edges: Vec<(String, String)> = self
            .jobs
            .iter()
            .flat_map(|(id, job)| job.needs.names().into_iter().map(move |n| (id.clone(), n)))
            .collect();

        Ok(topological_order(&nodes, &edges)?)
    }

    /// Jobs form a single chain where each stage needs exactly the previous
    /// one and none runs after a failure upstream
    pub fn is_linear_chain(&self) -> bool {
        let order = match self.validate() {
            Ok(order) => order,
            Err(_) => return false,
        };

        let mut previous: Option<&String> = None;
        for id in &order {
            let job = &self.jobs[id];
            let needs = job.needs.names();
            let gated = match previous {
                None => needs.is_empty(),
                Some(prev) => needs.len() == 1 && &needs[0] == prev && !job.runs_after_failure(),
            };
            if !gated {
                return false;
            }
            previous = Some(id);
        }

        true
    }

    /// Names of `${{ secrets.NAME }}` references anywhere in the file
    pub fn secrets(&self) -> BTreeSet<String> {
        const MARKER: &str = "secrets.";

        self.source
            .match_indices(MARKER)
            .map(|(at, _)| {
                self.source[at + MARKER.len()..]
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect::<String>()
            })
            .filter(|name| !name.is_empty())
            .collect()
    }
}
