use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use backline_events::QueryEvent;
use backline_policy::{Decision, Outcome, QueryIntent};

use crate::completion::ReplyCompletion;
use crate::directory::StatusDirectory;

/// A composed chat reply plus the reference identifier used for
/// escalation correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reference_id: String,
    pub text: String,
}

/// Builds reply text for query decisions.
///
/// Answers come from local templates grounded in the status directory. The
/// completion service, when wired in, only polishes an already-correct
/// template: one attempt, bounded deadline, template on any failure.
pub struct ReplyComposer {
    directory: Arc<dyn StatusDirectory>,
    completion: Option<Arc<dyn ReplyCompletion>>,
    completion_deadline: Duration,
}

impl ReplyComposer {
    pub fn new(directory: Arc<dyn StatusDirectory>) -> Self {
        Self {
            directory,
            completion: None,
            completion_deadline: Duration::from_secs(2),
        }
    }

    pub fn with_completion(
        mut self,
        completion: Arc<dyn ReplyCompletion>,
        deadline: Duration,
    ) -> Self {
        self.completion = Some(completion);
        self.completion_deadline = deadline;
        self
    }

    /// Compose the reply for a query decision.
    ///
    /// Escalated decisions get the "forwarded to support" template; the
    /// reference id lets the eventual human reply correlate back.
    pub fn compose(&self, decision: &Decision, query: &QueryEvent) -> ChatReply {
        let reference_id = reference_id(decision);

        if decision.outcome == Outcome::Escalated {
            return ChatReply {
                text: format!(
                    "Your query has been forwarded to our support team for personalized \
                     assistance. Reference ID: {reference_id}"
                ),
                reference_id,
            };
        }

        let template = self.answer_from_directory(query);
        let text = self.polish(&template);
        ChatReply { reference_id, text }
    }

    fn answer_from_directory(&self, query: &QueryEvent) -> String {
        match QueryIntent::parse(&query.text) {
            QueryIntent::OrderStatus {
                order_id: Some(order_id),
            } => match self.directory.order_status(order_id) {
                Some(status) => format!("Order #{order_id} is: {status}."),
                None => format!(
                    "I couldn't find order #{order_id}. Please check the order number."
                ),
            },
            QueryIntent::OrderStatus { order_id: None } => {
                "Please provide a valid order number (e.g. 'Where is my order #123?').".to_string()
            }
            QueryIntent::RestockStatus {
                product_id: Some(product_id),
            } => match self.directory.pending_restock(&product_id) {
                Some(quantity) => {
                    format!("Product {product_id} is pending restock ({quantity} units).")
                }
                None => format!("No restock is currently scheduled for product {product_id}."),
            },
            QueryIntent::RestockStatus { product_id: None } => {
                "Please provide a valid product ID (e.g. 'When will Product A101 be restocked?')."
                    .to_string()
            }
            QueryIntent::Unknown => "I can help with order tracking ('Where is my order #123?') \
                                     and restock timing ('When will Product A101 be restocked?'). \
                                     For other questions, please contact our support team."
                .to_string(),
        }
    }

    /// Single-attempt completion polish; the template is the fallback.
    fn polish(&self, template: &str) -> String {
        let Some(completion) = &self.completion else {
            return template.to_string();
        };

        let prompt = format!(
            "Rewrite this logistics support answer in a friendly tone, keeping every fact \
             unchanged: {template}"
        );
        match completion.complete(&prompt, self.completion_deadline) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => template.to_string(),
            Err(err) => {
                warn!(error = %err, "completion unavailable, using template reply");
                template.to_string()
            }
        }
    }
}

/// Reference id derived from the decision and its creation time.
fn reference_id(decision: &Decision) -> String {
    let hex = decision.id.as_uuid().simple().to_string();
    format!(
        "chat_{}_{}",
        decision.created_at.format("%Y%m%dT%H%M%S"),
        &hex[..6]
    )
}
