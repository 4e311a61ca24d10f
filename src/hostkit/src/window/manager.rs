use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::dispose::{BoxError, DisposeError, DisposeErrors};
use crate::service::{Inject, ServiceRegistry};
use crate::window::control::WindowControl;
use crate::window::table::WindowTable;
use crate::window::{ManagedWindow, Window, WindowError, WindowRef};

/// Owns a set of windows and their visibility, and draws the visible ones on
/// each frame.
///
/// Windows are drawn in registration order. Only windows visible at the
/// start of a draw pass are drawn, so every window draws at most once per
/// pass. Visibility requests made during a pass take effect from the next
/// one: a window shown mid-pass waits for it, and a later window hidden
/// mid-pass is still drawn in the current one.
///
/// A [`WindowManager`] is a [`Window`] itself, so managers can be nested. A
/// nested manager picks up the registry of its parent through injection.
pub struct WindowManager {
    table: Arc<RwLock<WindowTable>>,
    services: Option<ServiceRegistry>,
}

impl WindowManager {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(WindowTable::new())),
            services: None,
        }
    }

    /// Creates a manager which injects services from `services` into every
    /// window it constructs.
    pub fn with_services(services: ServiceRegistry) -> Self {
        let mut manager = Self::new();
        manager.services = Some(services);
        manager
    }

    pub fn services(&self) -> Option<&ServiceRegistry> {
        self.services.as_ref()
    }

    /// Returns a request channel wired to this manager.
    pub fn control(&self) -> WindowControl {
        WindowControl::attached(&self.table)
    }

    /// Constructs a `T`, hydrates it with services and takes ownership of it.
    /// A new window is constructed on every call, even if the manager already
    /// owns a `T`, in which case lookups keep resolving to the earlier one.
    pub fn add_window<T: ManagedWindow>(&self, initially_visible: bool) -> WindowRef<T> {
        let mut window = T::create(self.control());
        if let Some(services) = &self.services {
            services.inject_into(&mut window);
        }

        let window = Arc::new(Mutex::new(window));
        self.table
            .write()
            .push(Arc::clone(&window), initially_visible);
        log::debug!(
            "added window {} (visible: {initially_visible})",
            any::type_name::<T>()
        );
        WindowRef::new(window)
    }

    /// # Errors
    ///
    /// Returns [`WindowError::NotFound`] if the manager doesn't own a `T`.
    pub fn show_window<T: Window>(&self) -> Result<(), WindowError> {
        self.table.write().set_visible::<T>(true)
    }

    /// # Errors
    ///
    /// Returns [`WindowError::NotFound`] if the manager doesn't own a `T`.
    pub fn hide_window<T: Window>(&self) -> Result<(), WindowError> {
        self.table.write().set_visible::<T>(false)
    }

    /// Flips the visibility of `T` and returns the new one.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::NotFound`] if the manager doesn't own a `T`.
    pub fn toggle_window<T: Window>(&self) -> Result<bool, WindowError> {
        self.table.write().toggle::<T>()
    }

    /// # Errors
    ///
    /// Returns [`WindowError::NotFound`] if the manager doesn't own a `T`.
    pub fn window<T: Window>(&self) -> Result<WindowRef<T>, WindowError> {
        self.table.read().reference::<T>()
    }

    /// Returns whether `T` will be drawn on the next pass.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::NotFound`] if the manager doesn't own a `T`.
    pub fn is_visible<T: Window>(&self) -> Result<bool, WindowError> {
        self.table.read().is_visible::<T>()
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draws every visible window once, in registration order.
    ///
    /// While a window is drawn, its own control refuses to reference it,
    /// since the pass holds its lock.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a window. Windows after the failing
    /// one are not drawn in this pass.
    pub fn draw_pass(&self) -> Result<(), WindowError> {
        // The table must not stay locked while drawing, since windows send
        // requests to it.
        let windows = self.table.read().visible_windows();

        for (index, window) in windows {
            let mut visible = true;
            self.table.write().set_drawing(Some(index));
            let result = window.lock().draw(&mut visible);

            let mut table = self.table.write();
            table.set_drawing(None);
            if !visible {
                table.set_visible_at(index, false);
            }
            drop(table);
            result?;
        }
        Ok(())
    }

    /// Releases every window in registration order. A failed release doesn't
    /// stop the others. The manager owns no window afterwards.
    ///
    /// # Errors
    ///
    /// Returns a [`DisposeError`] if any window fails to be released.
    pub fn dispose(&self) -> Result<(), DisposeError> {
        let entries = self.table.write().take_entries();

        let mut errors = DisposeErrors::new();
        for entry in &entries {
            errors.record(entry.type_name(), entry.window().lock().dispose());
        }
        errors.finish()
    }
}

impl Window for WindowManager {
    fn draw(&mut self, visible: &mut bool) -> Result<(), WindowError> {
        if *visible {
            self.draw_pass()?;
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), BoxError> {
        WindowManager::dispose(self).map_err(Into::into)
    }
}

impl Inject for WindowManager {
    fn inject(&mut self, services: &ServiceRegistry) {
        if self.services.is_none() {
            self.services = services
                .get::<ServiceRegistry>()
                .map(|services| services.as_ref().clone());
        }
    }
}

impl ManagedWindow for WindowManager {
    fn create(_control: WindowControl) -> Self {
        Self::new()
    }
}

impl Drop for WindowManager {
    fn drop(&mut self) {
        if let Err(err) = WindowManager::dispose(self) {
            log::warn!("windows were not released cleanly on drop: {err}");
        }
    }
}

impl Debug for WindowManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("WindowManager")
            .field("windows", &self.len())
            .field("services", &self.services)
            .finish()
    }
}
