use std::mem;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::dispose::{DisposeError, DisposeErrors};
use crate::service::entry::ServiceEntry;
use crate::service::{Service, ServiceError};

pub struct RegistryCore {
    state: RwLock<RegistryState>,
}

impl RegistryCore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::new()),
        }
    }

    pub fn push(&self, entry: ServiceEntry) -> Result<(), ServiceError> {
        let mut state = self.state.write();
        if state.disposed {
            return Err(ServiceError::Disposed {
                service: entry.type_name(),
            });
        }
        log::debug!(
            "added service {} (owns disposal: {})",
            entry.type_name(),
            entry.owns_disposal()
        );
        state.entries.push(entry);
        Ok(())
    }

    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Service + ?Sized,
    {
        let state = self.state.read();
        state.entries.iter().find_map(ServiceEntry::view::<T>)
    }

    pub fn contains<T>(&self) -> bool
    where
        T: Service + ?Sized,
    {
        let state = self.state.read();
        state.entries.iter().any(ServiceEntry::is_compatible::<T>)
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.read().disposed
    }

    pub fn dispose(&self) -> Result<(), DisposeError> {
        let entries = {
            let mut state = self.state.write();
            if state.disposed {
                return Ok(());
            }
            state.disposed = true;
            mem::take(&mut state.entries)
        };

        // The lock is released here, so a service may still query the registry
        // while being released.
        let mut errors = DisposeErrors::new();
        for entry in &entries {
            if let Some(result) = entry.release() {
                errors.record(entry.type_name(), result);
            }
        }
        errors.finish()
    }
}

impl Drop for RegistryCore {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            log::warn!("services were not released cleanly on drop: {err}");
        }
    }
}

struct RegistryState {
    entries: Vec<ServiceEntry>,
    disposed: bool,
}

impl RegistryState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            disposed: false,
        }
    }
}
