//! One outstanding action per entity

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Entities with an action awaiting its response
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    entities: Arc<DashMap<String, i64>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `entity`; `None` while another action holds it
    pub fn try_begin(&self, entity: &str) -> Option<InFlightGuard> {
        match self.entities.entry(entity.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(shared::util::now_millis());
                Some(InFlightGuard {
                    entities: Arc::clone(&self.entities),
                    entity: entity.to_string(),
                })
            }
        }
    }

    pub fn is_busy(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }
}

/// Releases the entity when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    entities: Arc<DashMap<String, i64>>,
    entity: String,
}

impl InFlightGuard {
    pub fn entity(&self) -> &str {
        &self.entity
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.entities.remove(&self.entity);
    }
}
