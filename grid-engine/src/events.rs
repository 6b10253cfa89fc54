//! FILENAME: grid-engine/src/events.rs
//! Change notifications emitted by the `Grid` host facade.

use grid_model::Row;
use serde::Serialize;

use crate::definition::{FilterModel, SortSpec};

/// A change notification. Serializes as `{"type": "<kebab-name>", ...}`
/// with camelCase payload fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GridEvent {
    #[serde(rename_all = "camelCase")]
    SelectionChanged {
        selected_rows: Vec<Row>,
        selected_row_ids: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    SortChanged { sort_model: Vec<SortSpec> },

    #[serde(rename_all = "camelCase")]
    FilterChanged { filter_model: FilterModel },

    #[serde(rename_all = "camelCase")]
    PageChanged { current_page: usize, page_size: usize },

    #[serde(rename_all = "camelCase")]
    GroupExpanded { group_key: String, expanded: bool },

    #[serde(rename_all = "camelCase")]
    GroupByChanged { group_by: Vec<String> },

    /// Emitted when a resize drag ends.
    ColumnResized { field: String, width: f64 },
}

impl GridEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GridEvent::SelectionChanged { .. } => "selection-changed",
            GridEvent::SortChanged { .. } => "sort-changed",
            GridEvent::FilterChanged { .. } => "filter-changed",
            GridEvent::PageChanged { .. } => "page-changed",
            GridEvent::GroupExpanded { .. } => "group-expanded",
            GridEvent::GroupByChanged { .. } => "group-by-changed",
            GridEvent::ColumnResized { .. } => "column-resized",
        }
    }
}

/// Listener callback. Called synchronously, in subscription order.
pub type GridListener = Box<dyn FnMut(&GridEvent)>;

/// Handle returned by `EventBus::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, GridListener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    pub fn subscribe(&mut self, listener: GridListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &GridEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_event_payload_shapes() {
        let event = GridEvent::PageChanged {
            current_page: 2,
            page_size: 10,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "page-changed", "currentPage": 2, "pageSize": 10})
        );

        let event = GridEvent::GroupExpanded {
            group_key: "group_0_dept_Eng".to_string(),
            expanded: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "group-expanded");
        assert_eq!(json["groupKey"], "group_0_dept_Eng");
        assert_eq!(event.name(), "group-expanded");

        let event = GridEvent::SelectionChanged {
            selected_rows: vec![Row::new().with("id", 1)],
            selected_row_ids: vec!["1".to_string()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["selectedRowIds"], serde_json::json!(["1"]));
        assert_eq!(json["selectedRows"][0]["id"], 1.0);
    }

    #[test]
    fn test_column_resized_payload() {
        let event = GridEvent::ColumnResized {
            field: "name".to_string(),
            width: 180.0,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"type": "column-resized", "field": "name", "width": 180.0})
        );
        assert_eq!(event.name(), "column-resized");
    }

    #[test]
    fn test_subscribe_emit_unsubscribe() {
        let seen: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let mut bus = EventBus::new();

        let sink = Rc::clone(&seen);
        let id = bus.subscribe(Box::new(move |event| sink.borrow_mut().push(event.name())));

        bus.emit(&GridEvent::SortChanged { sort_model: Vec::new() });
        assert_eq!(*seen.borrow(), vec!["sort-changed"]);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&GridEvent::SortChanged { sort_model: Vec::new() });
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(bus.listener_count(), 0);
    }
}
