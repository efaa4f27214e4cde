// src/deploy/mod.rs
// DOCUMENTATION: Deployment descriptor checks
// PURPOSE: Validate the compose topology and CI pipeline shipped with the service

pub mod compose;
pub mod graph;
pub mod workflow;

pub use compose::{ComposeError, ComposeFile};
pub use graph::{topological_order, GraphError};
pub use workflow::{Workflow, WorkflowError};
