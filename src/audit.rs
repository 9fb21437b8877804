// 📜 Audit trail - every successful insert leaves an event row

use crate::error::StoreError;
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

pub fn insert_event(store: &dyn DataStore, event: &Event) -> Result<(), StoreError> {
    let data_json = event.data.to_string();

    store.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Best-effort: a failed audit write never fails the insert it describes
pub fn record(store: &dyn DataStore, event: Event) {
    if let Err(err) = insert_event(store, &event) {
        warn!(error = %err, event_type = %event.event_type, entity_id = %event.entity_id, "failed to record audit event");
    }
}

/// Events for one entity, newest first
pub fn events_for_entity(
    store: &dyn DataStore,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>, StoreError> {
    let result = store.query(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
        params![entity_type, entity_id],
    )?;

    let events = result
        .rows
        .into_iter()
        .filter_map(|row| {
            let [event_id, timestamp, event_type, entity_type, entity_id, data, actor]: [String; 7] =
                row.try_into().ok()?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .ok()?
                .with_timezone(&Utc);
            Some(Event {
                event_id,
                timestamp,
                event_type,
                entity_type,
                entity_id,
                data: serde_json::from_str(&data).ok()?,
                actor,
            })
        })
        .collect();

    Ok(events)
}
