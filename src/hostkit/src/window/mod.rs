mod control;
mod manager;
mod table;

use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use snafu::prelude::*;

use crate::dispose::BoxError;
use crate::service::Inject;

pub use control::WindowControl;
pub use manager::WindowManager;

/// A unit of drawable UI state driven by the host's frame loop.
///
/// A window never holds a reference to its siblings or to the manager owning
/// it. To affect another window, it goes through the [`WindowControl`] handed
/// to it on construction.
pub trait Window: Send + 'static {
    /// Performs one draw pass. `visible` holds the current visibility, and the
    /// window may set it to `false` to close itself. A window cannot reopen
    /// itself this way, since hidden windows are never drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails, including a failed request made
    /// through the window's [`WindowControl`]. The error is propagated to the
    /// caller of the draw pass.
    fn draw(&mut self, visible: &mut bool) -> Result<(), WindowError>;

    /// Releases the resources held by the window. Called once when the
    /// owning manager is torn down.
    ///
    /// # Errors
    ///
    /// Returns an error if some resource could not be released.
    fn dispose(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A [`Window`] which a [`WindowManager`] knows how to construct.
///
/// The manager constructs the window exactly once per
/// [`WindowManager::add_window`] call, hands it a [`WindowControl`] wired to
/// itself, and then fills its injectable slots.
pub trait ManagedWindow: Window + Inject + Sized {
    fn create(control: WindowControl) -> Self;
}

/// A shared handle to a window owned by a [`WindowManager`].
pub struct WindowRef<T: Window> {
    inner: Arc<Mutex<T>>,
}

impl<T: Window> WindowRef<T> {
    pub(crate) fn new(inner: Arc<Mutex<T>>) -> Self {
        Self { inner }
    }

    /// Locks the window, waiting for a draw pass drawing it to finish.
    /// [`WindowControl::reference`] never hands a window its own handle
    /// during its draw call, so a window cannot wait on itself this way.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Locks the window, or returns [`None`] if it's currently locked, e.g.
    /// because it's being drawn.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Window> Clone for WindowRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Window> Debug for WindowRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "WindowRef<{}>", any::type_name::<T>())
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WindowError {
    #[snafu(display("could not find any window of type {window}"))]
    #[non_exhaustive]
    NotFound { window: &'static str },
    #[snafu(display("window {window} is being drawn and cannot be referenced from its own draw call"))]
    #[non_exhaustive]
    BeingDrawn { window: &'static str },
    #[snafu(display("window {window} fails to draw"))]
    #[non_exhaustive]
    Draw {
        window: &'static str,
        source: BoxError,
    },
}

impl WindowError {
    /// Wraps an error raised while drawing the window `W`.
    pub fn draw_failed<W: Window>(source: impl Into<BoxError>) -> Self {
        Self::Draw {
            window: any::type_name::<W>(),
            source: source.into(),
        }
    }

    pub(crate) fn not_found<W: Window>() -> Self {
        Self::NotFound {
            window: any::type_name::<W>(),
        }
    }

    pub(crate) fn being_drawn<W: Window>() -> Self {
        Self::BeingDrawn {
            window: any::type_name::<W>(),
        }
    }
}
