use std::any::{self, TypeId};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::command::{CommandHost, CommandModule};
use crate::dispose::{BoxError, DisposeError, DisposeErrors};
use crate::service::ServiceRegistry;
use crate::util::any::{AsAny, DowncastArc};

trait ModuleInstance: AsAny + Send + Sync {
    fn release(&self) -> Result<(), BoxError>;
}

impl<M: CommandModule> ModuleInstance for M {
    fn release(&self) -> Result<(), BoxError> {
        CommandModule::dispose(self)
    }
}

struct InstalledNames {
    module: TypeId,
    module_name: &'static str,
    names: Vec<String>,
}

/// Installs [`CommandModule`]s into a [`CommandHost`].
///
/// Every installed module instance is kept until the registrar is torn down,
/// even after its commands have been removed. Teardown happens exactly once,
/// either through [`CommandRegistrar::dispose`] or on drop.
pub struct CommandRegistrar<H: CommandHost> {
    host: H,
    services: Option<ServiceRegistry>,
    installed: Vec<InstalledNames>,
    modules: Vec<Arc<dyn ModuleInstance>>,
}

impl<H: CommandHost> CommandRegistrar<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            services: None,
            installed: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Creates a registrar which injects services from `services` into every
    /// module it constructs.
    pub fn with_services(host: H, services: ServiceRegistry) -> Self {
        let mut registrar = Self::new(host);
        registrar.services = Some(services);
        registrar
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Constructs an `M`, hydrates it with services and registers its
    /// commands under their names and aliases.
    ///
    /// If commands of `M` are already registered, they are removed first and
    /// replaced by those of the new instance. The earlier instance stays
    /// alive until teardown. A name the host refuses is skipped.
    pub fn add_module<M: CommandModule>(&mut self) -> Arc<M> {
        let mut module = M::default();
        if let Some(services) = &self.services {
            services.inject_into(&mut module);
        }
        let module = Arc::new(module);

        self.remove_module::<M>();

        let mut names = Vec::new();
        for command in Arc::clone(&module).commands() {
            for name in command.names() {
                if self.host.add_handler(name, command.info().clone()) {
                    names.push(name.to_string());
                } else {
                    log::warn!("command {name} was refused by the host");
                }
            }
        }
        log::debug!(
            "installed command module {} with {} names",
            any::type_name::<M>(),
            names.len()
        );

        self.installed.push(InstalledNames {
            module: TypeId::of::<M>(),
            module_name: any::type_name::<M>(),
            names,
        });
        self.modules.push(Arc::clone(&module) as Arc<dyn ModuleInstance>);
        module
    }

    /// Returns the first instance of `M` constructed by this registrar, even
    /// if its commands have been removed since.
    pub fn module<M: CommandModule>(&self) -> Option<Arc<M>> {
        self.modules
            .iter()
            .find_map(|module| Arc::clone(module).downcast_arc::<M>())
    }

    /// Removes every command name registered for `M`. Returns `false` if no
    /// command of `M` is registered.
    pub fn remove_module<M: CommandModule>(&mut self) -> bool {
        let Some(index) = self
            .installed
            .iter()
            .position(|installed| installed.module == TypeId::of::<M>())
        else {
            return false;
        };

        let installed = self.installed.remove(index);
        self.remove_names(&installed);
        true
    }

    /// Removes all commands, then releases every module instance in
    /// construction order. A failed release doesn't stop the others.
    /// Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`DisposeError`] if any module fails to be released.
    pub fn dispose(&mut self) -> Result<(), DisposeError> {
        for installed in std::mem::take(&mut self.installed) {
            self.remove_names(&installed);
        }

        let mut errors = DisposeErrors::new();
        for module in self.modules.drain(..) {
            errors.record((*module).type_name(), module.release());
        }
        errors.finish()
    }

    fn remove_names(&mut self, installed: &InstalledNames) {
        for name in &installed.names {
            if !self.host.remove_handler(name) {
                log::warn!("command {name} was already gone from the host");
            }
        }
        log::debug!("removed commands of module {}", installed.module_name);
    }
}

impl<H: CommandHost> Drop for CommandRegistrar<H> {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            log::warn!("command modules were not released cleanly on drop: {err}");
        }
    }
}

impl<H: CommandHost + Debug> Debug for CommandRegistrar<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CommandRegistrar")
            .field("host", &self.host)
            .field("modules", &self.modules.len())
            .finish_non_exhaustive()
    }
}
