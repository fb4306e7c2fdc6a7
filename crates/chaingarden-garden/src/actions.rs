//! Planting and removing, with per-slot locking.
//!
//! A slot is locked from the moment an action is submitted until the
//! follow-up reload has been applied. A second submission on the same
//! slot in that window fails fast with [`GardenError::SlotBusy`] instead
//! of reaching the backend twice. Removals also lock the plant id, which
//! covers the case where no garden is loaded and the slot is unknown.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chaingarden_protocol::{ApiError, GardenApi, Plant, SessionToken};
use chaingarden_transport::Transport;

use crate::{GardenError, GardenState, refresh_garden};

// ---------------------------------------------------------------------------
// Slot locks
// ---------------------------------------------------------------------------

/// The slots and plant ids with an action in flight.
///
/// Cheap to clone; clones share the same sets.
#[derive(Debug, Clone, Default)]
pub struct SlotLocks {
    held: Arc<Mutex<HashSet<u32>>>,
    plants: Arc<Mutex<HashSet<String>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks `slot` until the returned guard is dropped.
    ///
    /// # Errors
    /// [`GardenError::SlotBusy`] if the slot is already locked.
    pub fn try_lock(&self, slot: u32) -> Result<SlotGuard, GardenError> {
        if !self.lock().insert(slot) {
            return Err(GardenError::SlotBusy(slot));
        }
        Ok(SlotGuard {
            slot,
            held: Arc::clone(&self.held),
        })
    }

    /// Locks `plant_id` until the returned guard is dropped.
    ///
    /// # Errors
    /// [`GardenError::PlantBusy`] if the plant is already locked.
    pub fn try_lock_plant(&self, plant_id: &str) -> Result<PlantGuard, GardenError> {
        if !lock_set(&self.plants).insert(plant_id.to_string()) {
            return Err(GardenError::PlantBusy(plant_id.to_string()));
        }
        Ok(PlantGuard {
            plant_id: plant_id.to_string(),
            plants: Arc::clone(&self.plants),
        })
    }

    pub fn is_locked(&self, slot: u32) -> bool {
        self.lock().contains(&slot)
    }

    /// Currently locked slots, in ascending order.
    pub fn locked_slots(&self) -> Vec<u32> {
        let mut slots: Vec<u32> = self.lock().iter().copied().collect();
        slots.sort_unstable();
        slots
    }

    pub fn is_plant_locked(&self, plant_id: &str) -> bool {
        lock_set(&self.plants).contains(plant_id)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<u32>> {
        lock_set(&self.held)
    }
}

fn lock_set<K>(set: &Mutex<HashSet<K>>) -> MutexGuard<'_, HashSet<K>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Releases its slot on drop, including when the action's future is
/// cancelled or panics.
#[derive(Debug)]
pub struct SlotGuard {
    slot: u32,
    held: Arc<Mutex<HashSet<u32>>>,
}

impl SlotGuard {
    pub fn slot(&self) -> u32 {
        self.slot
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        lock_set(&self.held).remove(&self.slot);
    }
}

/// Releases its plant id on drop.
#[derive(Debug)]
pub struct PlantGuard {
    plant_id: String,
    plants: Arc<Mutex<HashSet<String>>>,
}

impl PlantGuard {
    pub fn plant_id(&self) -> &str {
        &self.plant_id
    }
}

impl Drop for PlantGuard {
    fn drop(&mut self) {
        lock_set(&self.plants).remove(&self.plant_id);
    }
}

// ---------------------------------------------------------------------------
// Single requests
// ---------------------------------------------------------------------------

/// Rejects a planting the current snapshot already shows can't work.
///
/// Without a loaded garden there is nothing to check against, and an
/// empty catalog skips the plant-type check; the backend has the last
/// word either way.
pub fn check_plant_seed(
    state: &GardenState,
    slot: u32,
    plant_type_id: &str,
) -> Result<(), GardenError> {
    if let Some(garden) = state.garden() {
        if !garden.has_slot(slot) {
            return Err(GardenError::InvalidSlot(slot));
        }
        if garden.plant_at(slot).is_some() {
            return Err(GardenError::SlotOccupied(slot));
        }
    }
    if !state.plant_types().is_empty() && state.plant_type(plant_type_id).is_none() {
        return Err(GardenError::InvalidPlantType(plant_type_id.to_string()));
    }
    Ok(())
}

/// Asks the backend to plant `plant_type_id` in `slot`.
pub async fn plant_seed<T: Transport>(
    api: &GardenApi<T>,
    token: &SessionToken,
    slot: u32,
    plant_type_id: &str,
) -> Result<Plant, GardenError> {
    api.plant_seed(token, slot, plant_type_id)
        .await
        .map_err(|e| classify_plant_error(e, slot, plant_type_id))
}

/// Asks the backend to remove (harvest) a plant.
pub async fn remove_plant<T: Transport>(
    api: &GardenApi<T>,
    token: &SessionToken,
    plant_id: &str,
) -> Result<(), GardenError> {
    api.remove_plant(token, plant_id)
        .await
        .map_err(|e| match e {
            ApiError::Unauthorized(_) => GardenError::NotAuthenticated,
            other => GardenError::ActionFailed(other.message()),
        })
}

/// Maps a backend answer onto the slot-action error taxonomy.
fn classify_plant_error(err: ApiError, slot: u32, plant_type_id: &str) -> GardenError {
    if let ApiError::Unauthorized(_) = err {
        return GardenError::NotAuthenticated;
    }
    let message = err.message();
    let lowered = message.to_lowercase();
    if lowered.contains("slot already occupied") {
        GardenError::SlotOccupied(slot)
    } else if lowered.contains("invalid slot position") {
        GardenError::InvalidSlot(slot)
    } else if lowered.contains("plant_type") || lowered.contains("plant type") {
        GardenError::InvalidPlantType(plant_type_id.to_string())
    } else {
        GardenError::ActionFailed(message)
    }
}

// ---------------------------------------------------------------------------
// Locked action + reload
// ---------------------------------------------------------------------------

/// Plants a seed and reloads the garden, holding the slot lock
/// throughout.
///
/// A failed reload after a successful planting is logged; the planting
/// itself still counts as done.
pub async fn plant_and_reload<T: Transport>(
    api: &GardenApi<T>,
    token: &SessionToken,
    state: &tokio::sync::Mutex<GardenState>,
    locks: &SlotLocks,
    slot: u32,
    plant_type_id: &str,
) -> Result<Plant, GardenError> {
    let _guard = locks.try_lock(slot)?;
    check_plant_seed(&*state.lock().await, slot, plant_type_id)?;

    let plant = plant_seed(api, token, slot, plant_type_id).await?;
    tracing::info!(slot, plant_id = %plant.id, %plant_type_id, "seed planted");

    if let Err(e) = refresh_garden(api, token, state).await {
        tracing::warn!(slot, error = %e, "reload after planting failed");
    }
    Ok(plant)
}

/// Removes a plant and reloads the garden, holding the plant's lock (and
/// its slot's, when a loaded garden tells us the slot) throughout.
///
/// # Errors
/// - [`GardenError::PlantNotFound`]: the loaded garden has no such plant
/// - [`GardenError::PlantBusy`]: a removal of this plant is in flight
/// - [`GardenError::SlotBusy`]: another action holds the plant's slot
pub async fn remove_and_reload<T: Transport>(
    api: &GardenApi<T>,
    token: &SessionToken,
    state: &tokio::sync::Mutex<GardenState>,
    locks: &SlotLocks,
    plant_id: &str,
) -> Result<(), GardenError> {
    let _plant_guard = locks.try_lock_plant(plant_id)?;
    let slot = {
        let state = state.lock().await;
        match state.garden() {
            Some(garden) => match garden.plant(plant_id) {
                Some(plant) => Some(plant.slot_position),
                None => return Err(GardenError::PlantNotFound(plant_id.to_string())),
            },
            None => None,
        }
    };
    let _slot_guard = slot.map(|s| locks.try_lock(s)).transpose()?;

    remove_plant(api, token, plant_id).await?;
    tracing::info!(%plant_id, ?slot, "plant removed");

    if let Err(e) = refresh_garden(api, token, state).await {
        tracing::warn!(%plant_id, error = %e, "reload after removal failed");
    }
    Ok(())
}
