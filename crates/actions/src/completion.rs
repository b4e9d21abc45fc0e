use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Completion-service call failure.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
}

/// Port to the external natural-language completion service.
///
/// The composer makes at most **one** attempt per reply and treats any
/// error as "use the template instead"; implementations own the actual
/// transport and must respect the deadline they are given so the decision
/// pipeline never stalls on this call.
pub trait ReplyCompletion: Send + Sync {
    fn complete(&self, prompt: &str, deadline: Duration) -> Result<String, CompletionError>;
}

impl<C> ReplyCompletion for Arc<C>
where
    C: ReplyCompletion + ?Sized,
{
    fn complete(&self, prompt: &str, deadline: Duration) -> Result<String, CompletionError> {
        (**self).complete(prompt, deadline)
    }
}
