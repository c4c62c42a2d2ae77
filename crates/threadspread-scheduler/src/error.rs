use miette::Diagnostic;
use thiserror::Error;

/// Scheduler error type
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    /// No node passed the admissibility gate for this pod.
    ///
    /// Expected and recoverable: the pod stays pending and is retried on the
    /// next cycle.
    #[error("No eligible node for pod {pod_name}: {reason}")]
    #[diagnostic(
        code(scheduler::no_eligible_node),
        help("Check node CPU capacities and the namespace's aggregated CPU requests")
    )]
    NoEligibleNode { pod_name: String, reason: String },

    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    #[diagnostic(
        code(scheduler::kube_api),
        help("Check cluster connectivity and the scheduler's RBAC permissions")
    )]
    KubeApi(#[from] kube::Error),

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(scheduler::internal_error),
        help("This is likely a bug. Please report it")
    )]
    Internal { message: String },
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

impl SchedulerError {
    /// Create a NoEligibleNode error
    pub fn no_eligible_node(pod_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NoEligibleNode {
            pod_name: pod_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
