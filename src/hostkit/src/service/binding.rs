use std::sync::Arc;

use crate::dispose::Dispose;
use crate::service::entry::ServiceEntry;
use crate::service::{Service, ServiceError, ServiceRegistry};

/// Starts describing how `instance` is registered. Finish with
/// [`ServiceBinding::set_on`].
pub fn bind<T>(instance: Arc<T>) -> ServiceBinding<T>
where
    T: Service + ?Sized,
{
    ServiceBinding::new(instance)
}

pub struct ServiceBinding<T>
where
    T: Service + ?Sized,
{
    instance: Arc<T>,
    entry: ServiceEntry,
}

impl<T> ServiceBinding<T>
where
    T: Service + ?Sized,
{
    pub(super) fn new(instance: Arc<T>) -> Self {
        let entry = ServiceEntry::new(Arc::clone(&instance));
        Self { instance, entry }
    }

    /// Makes the service also resolvable as `U`, typically a trait object
    /// implemented by `T`.
    pub fn exposed_as<U>(mut self, cast: impl FnOnce(Arc<T>) -> Arc<U>) -> Self
    where
        U: Service + ?Sized,
    {
        self.entry.add_view(cast(Arc::clone(&self.instance)));
        self
    }

    /// Leaves the disposal of the service to someone else.
    pub fn borrowed(mut self) -> Self {
        self.entry.set_owns_disposal(false);
        self
    }

    pub fn set_on(self, services: &ServiceRegistry) -> Result<(), ServiceError> {
        services.push_entry(self.entry)
    }
}

impl<T> ServiceBinding<T>
where
    T: Dispose + ?Sized,
{
    /// Releases the service through [`Dispose`] when the registry is torn
    /// down, unless the binding is also [`borrowed`](Self::borrowed).
    pub fn disposable(mut self) -> Self {
        let instance = Arc::clone(&self.instance);
        self.entry.set_disposer(Box::new(move || instance.dispose()));
        self
    }
}
