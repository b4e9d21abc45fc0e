//! Source adapter: raw tabular rows → typed, validated events.
//!
//! The data source (spreadsheet, table, export) is an external collaborator;
//! it hands over stringly rows. Everything is validated here so that a
//! malformed row is rejected before any decision exists for it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backline_core::{DomainError, DomainResult, ProductId, QueryId};

use crate::event::{QueryEvent, ReturnEvent};

/// One row of the returns table, as read from the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReturnRow {
    pub product_id: Option<String>,
    pub return_quantity: Option<i64>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// One row of the incoming-queries table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQueryRow {
    pub query_id: Option<String>,
    pub text: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Validate a batch of return rows and aggregate them by product.
///
/// Rows for the same product are summed into a single event (the pipeline
/// decides per product, not per row); the earliest timestamp of the batch
/// is kept as the event's business time. Any malformed row rejects the
/// whole batch with a validation error naming the offending row.
pub fn normalize_returns(rows: &[RawReturnRow]) -> DomainResult<Vec<ReturnEvent>> {
    let mut by_product: BTreeMap<ProductId, (u32, DateTime<Utc>)> = BTreeMap::new();

    for (idx, row) in rows.iter().enumerate() {
        let product_id = match row.product_id.as_deref() {
            Some(raw) => ProductId::new(raw)
                .map_err(|e| DomainError::validation(format!("returns row {idx}: {e}")))?,
            None => {
                return Err(DomainError::validation(format!(
                    "returns row {idx}: missing product_id"
                )));
            }
        };

        let quantity = match row.return_quantity {
            Some(q) if q >= 0 => q as u32,
            Some(q) => {
                return Err(DomainError::validation(format!(
                    "returns row {idx}: negative return_quantity {q}"
                )));
            }
            None => {
                return Err(DomainError::validation(format!(
                    "returns row {idx}: missing return_quantity"
                )));
            }
        };

        let occurred_at = row.occurred_at.ok_or_else(|| {
            DomainError::validation(format!("returns row {idx}: missing occurred_at"))
        })?;

        by_product
            .entry(product_id)
            .and_modify(|(total, earliest)| {
                *total += quantity;
                if occurred_at < *earliest {
                    *earliest = occurred_at;
                }
            })
            .or_insert((quantity, occurred_at));
    }

    Ok(by_product
        .into_iter()
        .map(|(product_id, (return_quantity, occurred_at))| ReturnEvent {
            product_id,
            return_quantity,
            occurred_at,
        })
        .collect())
}

/// Validate a batch of query rows.
pub fn normalize_queries(rows: &[RawQueryRow]) -> DomainResult<Vec<QueryEvent>> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let query_id = match row.query_id.as_deref() {
                Some(raw) => QueryId::new(raw)
                    .map_err(|e| DomainError::validation(format!("query row {idx}: {e}")))?,
                None => {
                    return Err(DomainError::validation(format!(
                        "query row {idx}: missing query_id"
                    )));
                }
            };

            let text = match row.text.as_deref().map(str::trim) {
                Some(t) if !t.is_empty() => t.to_owned(),
                _ => {
                    return Err(DomainError::validation(format!(
                        "query row {idx}: missing or empty text"
                    )));
                }
            };

            let occurred_at = row.occurred_at.ok_or_else(|| {
                DomainError::validation(format!("query row {idx}: missing occurred_at"))
            })?;

            Ok(QueryEvent {
                query_id,
                text,
                occurred_at,
            })
        })
        .collect()
}
