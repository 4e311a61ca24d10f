#![allow(clippy::new_without_default)]

extern crate self as hostkit;

pub mod command;
pub mod dispose;
pub mod service;
pub mod window;
mod util;

pub use hostkit_derive::Inject;

pub mod prelude {
    pub use crate::command::{Command, CommandHost, CommandInfo, CommandModule, CommandRegistrar};
    pub use crate::dispose::{BoxError, Dispose, DisposeError};
    pub use crate::service::{bind, Inject, ServiceError, ServiceModule, ServiceRegistry};
    pub use crate::window::{
        ManagedWindow, Window, WindowControl, WindowError, WindowManager, WindowRef,
    };
}
