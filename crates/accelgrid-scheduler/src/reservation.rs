//! Outstanding resource holds, keyed by `(workload_id, namespace)`.
//!
//! A reservation is created and destroyed only through this store. The
//! scheduler counts every live hold as committed capacity on its node, so
//! two workloads cannot both be placed into the same free space before
//! either is admitted.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use accel_core::{ResourceQuantity, ResourceReservation};

use crate::error::{SchedulerError, SchedulerResult};

type ReservationKey = (String, String);

#[derive(Debug, Default)]
pub struct ReservationStore {
    entries: RwLock<HashMap<ReservationKey, ResourceReservation>>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a hold. A live key must be deleted before it can be reused.
    pub fn create(&self, reservation: ResourceReservation) -> SchedulerResult<()> {
        validate(&reservation)?;
        let key = (reservation.workload_id.clone(), reservation.namespace.clone());

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&key) {
            warn!(
                workload = %reservation.workload_id,
                namespace = %reservation.namespace,
                "reservation already exists"
            );
            return Err(SchedulerError::ReservationAlreadyExists {
                workload_id: key.0,
                namespace: key.1,
            });
        }

        debug!(
            workload = %reservation.workload_id,
            namespace = %reservation.namespace,
            node = %reservation.node_name,
            "reservation created"
        );
        entries.insert(key, reservation);
        Ok(())
    }

    /// Remove and return the hold for this key.
    pub fn delete(&self, workload_id: &str, namespace: &str) -> SchedulerResult<ResourceReservation> {
        let key = (workload_id.to_string(), namespace.to_string());
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);

        match removed {
            Some(reservation) => {
                debug!(workload = %workload_id, %namespace, "reservation deleted");
                Ok(reservation)
            }
            None => {
                warn!(workload = %workload_id, %namespace, "no reservation to delete");
                Err(SchedulerError::ReservationNotFound {
                    workload_id: key.0,
                    namespace: key.1,
                })
            }
        }
    }

    pub fn has(&self, workload_id: &str, namespace: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(workload_id.to_string(), namespace.to_string()))
    }

    pub fn get(&self, workload_id: &str, namespace: &str) -> Option<ResourceReservation> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(workload_id.to_string(), namespace.to_string()))
            .cloned()
    }

    /// Holds against `node_name`, ordered by namespace then workload id.
    pub fn for_node(&self, node_name: &str) -> Vec<ResourceReservation> {
        let mut found: Vec<ResourceReservation> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|r| r.node_name == node_name)
            .cloned()
            .collect();
        sort(&mut found);
        found
    }

    /// Snapshot of every live hold, ordered by namespace then workload id.
    pub fn all(&self) -> Vec<ResourceReservation> {
        let mut found: Vec<ResourceReservation> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        sort(&mut found);
        found
    }

    /// Total reserved on `node_name`.
    pub fn committed_on(&self, node_name: &str) -> ResourceQuantity {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|r| r.node_name == node_name)
            .map(|r| r.reserved)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate(reservation: &ResourceReservation) -> SchedulerResult<()> {
    if reservation.workload_id.trim().is_empty() || reservation.namespace.trim().is_empty() {
        return Err(SchedulerError::InvalidInput(
            "reservation needs a workload id and namespace".to_string(),
        ));
    }
    if reservation.node_name.trim().is_empty() {
        return Err(SchedulerError::InvalidInput(format!(
            "reservation {}/{} names no node",
            reservation.namespace, reservation.workload_id
        )));
    }
    reservation.reserved.validate()?;
    Ok(())
}

fn sort(reservations: &mut [ResourceReservation]) {
    reservations.sort_by(|a, b| (&a.namespace, &a.workload_id).cmp(&(&b.namespace, &b.workload_id)));
}
