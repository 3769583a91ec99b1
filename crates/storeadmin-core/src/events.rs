//! Domain events raised by admin operations.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use storeadmin_catalog::prelude::*;

use crate::form::FormData;
use crate::tabs::ProductEditModel;

/// Something an admin operation changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdminEvent {
    /// A product edit form was applied. Carries the bound model, the updated
    /// product and the raw posted form.
    ProductEdited {
        model: Box<ProductEditModel>,
        product: Box<Product>,
        form: FormData,
    },
    CombinationsCreated {
        product_id: ProductId,
        created: usize,
    },
    CombinationsDeleted {
        product_id: ProductId,
        deleted: usize,
    },
    BundleItemsAdded {
        bundle_product_id: ProductId,
        item_ids: Vec<BundleItemId>,
    },
    BundleItemUpdated {
        bundle_item_id: BundleItemId,
        filters: usize,
    },
}

impl AdminEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AdminEvent::ProductEdited { .. } => "product_edited",
            AdminEvent::CombinationsCreated { .. } => "combinations_created",
            AdminEvent::CombinationsDeleted { .. } => "combinations_deleted",
            AdminEvent::BundleItemsAdded { .. } => "bundle_items_added",
            AdminEvent::BundleItemUpdated { .. } => "bundle_item_updated",
        }
    }
}

/// Receives admin events.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: AdminEvent);
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<AdminEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AdminEvent> {
        self.events.lock().clone()
    }

    /// Remove and return the recorded events.
    pub fn take(&self) -> Vec<AdminEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: AdminEvent) {
        self.events.lock().push(event);
    }
}

/// Logs events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, event: AdminEvent) {
        match &event {
            AdminEvent::ProductEdited { product, .. } => {
                tracing::info!(event = event.name(), product_id = %product.id, "admin event");
            }
            AdminEvent::CombinationsCreated { product_id, created } => {
                tracing::info!(event = event.name(), %product_id, created, "admin event");
            }
            AdminEvent::CombinationsDeleted { product_id, deleted } => {
                tracing::info!(event = event.name(), %product_id, deleted, "admin event");
            }
            AdminEvent::BundleItemsAdded {
                bundle_product_id,
                item_ids,
            } => {
                tracing::info!(
                    event = event.name(),
                    %bundle_product_id,
                    items = item_ids.len(),
                    "admin event"
                );
            }
            AdminEvent::BundleItemUpdated {
                bundle_item_id,
                filters,
            } => {
                tracing::info!(event = event.name(), %bundle_item_id, filters, "admin event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_publisher() {
        let publisher = RecordingPublisher::new();
        publisher.publish(AdminEvent::CombinationsCreated {
            product_id: ProductId::new(1),
            created: 6,
        });
        assert_eq!(publisher.len(), 1);
        assert_eq!(publisher.take()[0].name(), "combinations_created");
        assert!(publisher.is_empty());
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = AdminEvent::CombinationsDeleted {
            product_id: ProductId::new(4),
            deleted: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "combinations_deleted");
        assert_eq!(json["product_id"], 4);
    }
}
