//! Query intent recognition.
//!
//! Pattern matching over the customer's free text: which known question is
//! being asked, and which identifiers it carries. Unknown intents are not
//! an error, they just score lower.

use std::sync::LazyLock;

use regex::Regex;

use backline_core::ProductId;

static ORDER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)order\s*#?\s*(\d+)").expect("order id pattern"));

static PRODUCT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)product\s+([A-Za-z]\d+)").expect("product id pattern"));

/// Recognized question categories.
///
/// Identifier fields are `Option`: a matched intent with a missing or
/// unparsable identifier is still that intent, and the reply composer asks
/// for the identifier instead of answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    /// "Where is my order #123?"
    OrderStatus { order_id: Option<u64> },
    /// "When will Product A101 be restocked?"
    RestockStatus { product_id: Option<ProductId> },
    Unknown,
}

impl QueryIntent {
    pub fn is_known(&self) -> bool {
        !matches!(self, QueryIntent::Unknown)
    }

    /// Classify a query text.
    pub fn parse(text: &str) -> QueryIntent {
        let lowered = text.to_lowercase();

        let order_words = ["where", "status", "track", "check"];
        if lowered.contains("order") && order_words.iter().any(|w| lowered.contains(w)) {
            return QueryIntent::OrderStatus {
                order_id: extract_order_id(text),
            };
        }

        if lowered.contains("product") && lowered.contains("restock") {
            return QueryIntent::RestockStatus {
                product_id: extract_product_id(text),
            };
        }

        QueryIntent::Unknown
    }
}

fn extract_order_id(text: &str) -> Option<u64> {
    ORDER_ID
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_product_id(text: &str) -> Option<ProductId> {
    PRODUCT_ID
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| ProductId::new(m.as_str().to_uppercase()).ok())
}
