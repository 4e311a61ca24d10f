use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::window::table::WindowTable;
use crate::window::{Window, WindowError, WindowRef};

/// The request channel through which a window asks its owning manager to
/// open, close or hand out a sibling window.
///
/// A detached control, or one whose manager has been dropped, turns every
/// request into a no-op, so that a window can be exercised without any
/// manager. A control wired to a live manager reports requests for window
/// types the manager doesn't own as [`WindowError::NotFound`], since they
/// indicate a wiring bug.
///
/// Requests take effect immediately, but a window opened during a draw pass
/// is only drawn starting from the next pass.
#[derive(Debug, Clone, Default)]
pub struct WindowControl {
    table: Option<Weak<RwLock<WindowTable>>>,
}

impl WindowControl {
    pub fn detached() -> Self {
        Self { table: None }
    }

    pub(super) fn attached(table: &Arc<RwLock<WindowTable>>) -> Self {
        Self {
            table: Some(Arc::downgrade(table)),
        }
    }

    /// Returns `true` if requests reach a live manager.
    pub fn is_attached(&self) -> bool {
        self.table
            .as_ref()
            .is_some_and(|table| table.strong_count() > 0)
    }

    /// Requests that the sibling window `T` be shown.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::NotFound`] if the manager doesn't own a `T`.
    pub fn open<T: Window>(&self) -> Result<(), WindowError> {
        self.with_table(|table| table.set_visible::<T>(true))
            .unwrap_or(Ok(()))
    }

    /// Requests that the sibling window `T` be hidden.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::NotFound`] if the manager doesn't own a `T`.
    pub fn close<T: Window>(&self) -> Result<(), WindowError> {
        self.with_table(|table| table.set_visible::<T>(false))
            .unwrap_or(Ok(()))
    }

    /// Requests a handle to the sibling window `T`. Returns `Ok(None)` if the
    /// control is detached.
    ///
    /// A window that needs its own state during its draw call already has it
    /// through `&mut self`, so asking for the window being drawn is refused.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::NotFound`] if the manager doesn't own a `T`, or
    /// [`WindowError::BeingDrawn`] if `T` is the window currently drawn.
    pub fn reference<T: Window>(&self) -> Result<Option<WindowRef<T>>, WindowError> {
        self.with_table(|table| table.request_reference::<T>())
            .transpose()
    }

    fn with_table<R>(&self, f: impl FnOnce(&mut WindowTable) -> R) -> Option<R> {
        let table = self.table.as_ref()?.upgrade()?;
        let mut table = table.write();
        Some(f(&mut table))
    }
}
