//! `backline-actions` — execution of approved decisions.
//!
//! Produces the outward-facing artifacts: restock request records for the
//! persistence layer to store, and chat replies for the query surface. The
//! optional completion service is only ever touched from the
//! reply-composition step, one attempt, with a template fallback.

pub mod completion;
pub mod directory;
pub mod executor;
pub mod reply;
pub mod restock;

pub use completion::{CompletionError, ReplyCompletion};
pub use directory::{InMemoryDirectory, StatusDirectory};
pub use executor::{ActionExecutor, ActionResult, ExecutionError};
pub use reply::{ChatReply, ReplyComposer};
pub use restock::{restock_quantity, RestockRequest};
