use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use memberbill_core::Money;
use memberbill_events::Event;

use crate::invoice::InvoiceId;
use crate::line_item::LineItemId;

/// Aggregate type recorded on line-item event envelopes.
pub const LINE_ITEM_AGGREGATE_TYPE: &str = "invoicing.line_item";

/// Event: LineItemSaved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemSaved {
    pub line_item_id: LineItemId,
    pub invoice_id: InvoiceId,
    pub cost: Money,
    pub total: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRemoved {
    pub line_item_id: LineItemId,
    pub invoice_id: InvoiceId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineItemEvent {
    LineItemSaved(LineItemSaved),
    LineItemRemoved(LineItemRemoved),
}

impl LineItemEvent {
    /// The invoice whose totals the change affects.
    pub fn invoice_id(&self) -> InvoiceId {
        match self {
            LineItemEvent::LineItemSaved(e) => e.invoice_id,
            LineItemEvent::LineItemRemoved(e) => e.invoice_id,
        }
    }

    pub fn line_item_id(&self) -> LineItemId {
        match self {
            LineItemEvent::LineItemSaved(e) => e.line_item_id,
            LineItemEvent::LineItemRemoved(e) => e.line_item_id,
        }
    }
}

impl Event for LineItemEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LineItemEvent::LineItemSaved(_) => "invoicing.line_item.saved",
            LineItemEvent::LineItemRemoved(_) => "invoicing.line_item.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LineItemEvent::LineItemSaved(e) => e.occurred_at,
            LineItemEvent::LineItemRemoved(e) => e.occurred_at,
        }
    }
}
