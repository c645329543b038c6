//! Remaining-quantity accounting.
//!
//! A line's `quantity_remaining` only moves through this tracker. Requests are
//! planned in full before any line is touched, so a failing request leaves
//! the document exactly as it was.

use docflow_shared::types::{DocumentId, LineItemId, ratio_as_percent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::document::{
    Document, DocumentStatus, DocumentType, FulfillmentStatus, LineItem, SourceReference,
};
use crate::fulfillment::error::FulfillmentError;

/// Quantity requested against one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAllocation {
    /// The line to draw from.
    pub line_item_id: LineItemId,
    /// Quantity to deliver.
    pub delivery_quantity: Decimal,
}

/// Delivery progress of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    /// The line.
    pub line_item_id: LineItemId,
    /// Quantity on the line.
    pub quantity: Decimal,
    /// `quantity − quantity_remaining`.
    pub delivered_quantity: Decimal,
    /// Quantity still open.
    pub quantity_remaining: Decimal,
    /// `delivered / quantity × 100`.
    pub percent_complete: Decimal,
}

/// Per-line and aggregate delivery progress of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentReport {
    /// The document reported on.
    pub document_id: DocumentId,
    /// Its type.
    pub document_type: DocumentType,
    /// One entry per line, in document order.
    pub items: Vec<ItemProgress>,
    /// Σ quantity.
    pub total_quantity: Decimal,
    /// Σ delivered.
    pub delivered_quantity: Decimal,
    /// Σ remaining.
    pub quantity_remaining: Decimal,
    /// Aggregate completion percentage.
    pub percent_complete: Decimal,
    /// Aggregate overlay.
    pub status: FulfillmentStatus,
}

/// Stateless tracker for delivered quantities.
pub struct FulfillmentTracker;

impl FulfillmentTracker {
    /// Progress of a single line.
    #[must_use]
    pub fn item_progress(line: &LineItem) -> ItemProgress {
        let delivered_quantity = line.delivered_quantity();
        ItemProgress {
            line_item_id: line.id,
            quantity: line.quantity(),
            delivered_quantity,
            quantity_remaining: line.quantity_remaining,
            percent_complete: completion(delivered_quantity, line.quantity()),
        }
    }

    /// Progress of every line plus the aggregate.
    #[must_use]
    pub fn report(document: &Document) -> FulfillmentReport {
        let items: Vec<ItemProgress> = document
            .line_items
            .iter()
            .map(Self::item_progress)
            .collect();
        let total_quantity: Decimal = items.iter().map(|i| i.quantity).sum();
        let delivered_quantity: Decimal = items.iter().map(|i| i.delivered_quantity).sum();

        FulfillmentReport {
            document_id: document.id,
            document_type: document.document_type,
            total_quantity,
            delivered_quantity,
            quantity_remaining: items.iter().map(|i| i.quantity_remaining).sum(),
            percent_complete: completion(delivered_quantity, total_quantity),
            status: Self::status(document),
            items,
        }
    }

    /// Aggregate overlay of a document.
    #[must_use]
    pub fn status(document: &Document) -> FulfillmentStatus {
        FulfillmentStatus::from_quantities(document.delivered_quantity(), document.total_quantity())
    }

    /// Validates a request without touching the document.
    ///
    /// Repeated lines are summed before checking. The result holds one entry
    /// per line in first-seen order.
    ///
    /// # Errors
    ///
    /// - `EmptyAllocation` for an empty request
    /// - `UnknownLineItem` for a line not on the document
    /// - `InvalidQuantity` for a non-positive quantity
    /// - `QuantityTooLarge` if a line's requests sum past `Decimal` range
    /// - `OverAllocation` if a line's total exceeds its remaining quantity
    pub fn plan(
        document: &Document,
        allocations: &[DeliveryAllocation],
    ) -> Result<Vec<DeliveryAllocation>, FulfillmentError> {
        if allocations.is_empty() {
            return Err(FulfillmentError::EmptyAllocation);
        }

        let merged = merge(allocations)?;

        for allocation in &merged {
            let line = document.line_item(allocation.line_item_id).ok_or(
                FulfillmentError::UnknownLineItem {
                    line_item_id: allocation.line_item_id,
                },
            )?;
            if allocation.delivery_quantity > line.quantity_remaining {
                return Err(FulfillmentError::OverAllocation {
                    line_item_id: line.id,
                    requested: allocation.delivery_quantity,
                    remaining: line.quantity_remaining,
                });
            }
        }

        Ok(merged)
    }

    /// Plans a request and decrements the remaining quantities.
    ///
    /// # Errors
    ///
    /// Same as [`FulfillmentTracker::plan`]; on error nothing changes.
    pub fn allocate(
        document: &mut Document,
        allocations: &[DeliveryAllocation],
    ) -> Result<Vec<DeliveryAllocation>, FulfillmentError> {
        let plan = Self::plan(document, allocations)?;
        for allocation in &plan {
            if let Some(line) = document
                .line_items
                .iter_mut()
                .find(|l| l.id == allocation.line_item_id)
            {
                line.quantity_remaining -= allocation.delivery_quantity;
            }
        }
        Ok(plan)
    }

    /// Records goods handed over on an approved delivery note.
    ///
    /// # Errors
    ///
    /// `NotDeliverable` unless `note` is an approved delivery note, otherwise
    /// the same as [`FulfillmentTracker::plan`].
    pub fn record_delivery(
        note: &mut Document,
        deliveries: &[DeliveryAllocation],
    ) -> Result<Vec<DeliveryAllocation>, FulfillmentError> {
        if note.document_type != DocumentType::DeliveryNote
            || note.status != DocumentStatus::Approved
        {
            return Err(FulfillmentError::NotDeliverable {
                document_type: note.document_type,
                status: note.status,
            });
        }
        Self::allocate(note, deliveries)
    }

    /// Quantities a delivery note draws from its receipt's lines.
    ///
    /// Lines without a line-item origin are skipped.
    #[must_use]
    pub fn drawn_from_source(note: &Document) -> Vec<DeliveryAllocation> {
        note.line_items
            .iter()
            .filter_map(|line| match line.source_reference {
                Some(SourceReference::LineItem(source)) => Some(DeliveryAllocation {
                    line_item_id: source,
                    delivery_quantity: line.quantity(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Gives previously allocated quantities back to their lines.
    ///
    /// # Errors
    ///
    /// `UnknownLineItem`, `InvalidQuantity`, `QuantityTooLarge` or
    /// `ReleaseExceedsDelivered`; on error nothing changes.
    pub fn release(
        document: &mut Document,
        allocations: &[DeliveryAllocation],
    ) -> Result<(), FulfillmentError> {
        let merged = merge(allocations)?;

        for allocation in &merged {
            let line = document.line_item(allocation.line_item_id).ok_or(
                FulfillmentError::UnknownLineItem {
                    line_item_id: allocation.line_item_id,
                },
            )?;
            if allocation.delivery_quantity > line.delivered_quantity() {
                return Err(FulfillmentError::ReleaseExceedsDelivered {
                    line_item_id: line.id,
                    requested: allocation.delivery_quantity,
                    delivered: line.delivered_quantity(),
                });
            }
        }

        for allocation in &merged {
            if let Some(line) = document
                .line_items
                .iter_mut()
                .find(|l| l.id == allocation.line_item_id)
            {
                line.quantity_remaining += allocation.delivery_quantity;
            }
        }
        Ok(())
    }
}

/// Sums requests per line in first-seen order.
fn merge(allocations: &[DeliveryAllocation]) -> Result<Vec<DeliveryAllocation>, FulfillmentError> {
    let mut merged: Vec<DeliveryAllocation> = Vec::with_capacity(allocations.len());
    for allocation in allocations {
        if allocation.delivery_quantity <= Decimal::ZERO {
            return Err(FulfillmentError::InvalidQuantity {
                line_item_id: allocation.line_item_id,
                quantity: allocation.delivery_quantity,
            });
        }
        match merged
            .iter_mut()
            .find(|m| m.line_item_id == allocation.line_item_id)
        {
            Some(existing) => {
                existing.delivery_quantity = existing
                    .delivery_quantity
                    .checked_add(allocation.delivery_quantity)
                    .ok_or(FulfillmentError::QuantityTooLarge {
                        line_item_id: allocation.line_item_id,
                    })?;
            }
            None => merged.push(*allocation),
        }
    }
    Ok(merged)
}

/// Delivered never exceeds the line quantity, so the ratio stays within 100.
fn completion(delivered: Decimal, total: Decimal) -> Decimal {
    ratio_as_percent(delivered, total).unwrap_or(Decimal::ONE_HUNDRED)
}
