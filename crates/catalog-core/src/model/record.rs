use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::entities::CatalogEntity;
use super::entity_id::{EntityId, RecordKey};
use crate::error::CoreError;

/// A cached entity: the typed view the console renders plus the full
/// last-known server representation.
///
/// `full_data` is what partial updates are merged into, so fields the
/// view does not model are never dropped on the way back to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
    pub key: RecordKey,
    pub id: Option<EntityId>,
    pub view: T,
    pub full_data: Map<String, Value>,
}

impl<T: CatalogEntity> Record<T> {
    /// Build a record from a canonical server payload.
    pub fn from_server(value: Value) -> Result<Self, CoreError> {
        let Value::Object(full_data) = value else {
            return Err(CoreError::Internal(format!(
                "expected a JSON object for {}, got {value}",
                T::LABEL
            )));
        };
        let view: T = serde_json::from_value(Value::Object(full_data.clone()))?;
        let id = view.id();
        let key = match id {
            Some(id) => RecordKey::for_entity(T::LABEL, id),
            None => RecordKey::from(format!("{}:local:{}", T::LABEL, Uuid::new_v4())),
        };
        Ok(Self {
            key,
            id,
            view,
            full_data,
        })
    }

    /// `full_data` with `partial` merged over it, leaving `self` untouched.
    pub fn merged_payload(&self, partial: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = self.full_data.clone();
        for (field, value) in partial {
            merged.insert(field.clone(), value.clone());
        }
        merged
    }

    pub fn name(&self) -> &str {
        self.view.name()
    }
}
