pub mod deployments;
pub mod lifecycle;

pub use deployments::{seed_deployments, DeploymentLedger};
pub use lifecycle::{
    CompletionHandle, CompletionOutcome, CompletionTarget, LifecycleSettings, LifecycleSimulator,
    RecordKind,
};
