mod binding;
mod core;
mod entry;
mod inject;
mod module;

use std::any::{self, Any, TypeId};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::dispose::{BoxError, Dispose, DisposeError};
use crate::service::core::RegistryCore;
use crate::service::entry::ServiceEntry;

pub use binding::{bind, ServiceBinding};
pub use hostkit_derive::Inject;
pub use inject::Inject;
pub use module::ServiceModule;

/// Any type which can be registered into a [`ServiceRegistry`], including
/// trait objects such as `dyn Logger` for `trait Logger: Send + Sync`.
pub trait Service: Send + Sync + 'static {}

impl<T> Service for T where T: Send + Sync + ?Sized + 'static {}

/// An ordered collection of shared service instances, looked up by type.
///
/// A [`ServiceRegistry`] is a handle: cloning it is cheap and every clone
/// refers to the same set of services. Services are stored in insertion
/// order, and a lookup returns the first one compatible with the requested
/// type. Duplicate registrations are legal, and earlier ones shadow later ones.
///
/// The registry can always be looked up as a service of itself, so that
/// anything hydrated through [`ServiceRegistry::inject_into`] may ask for the
/// registry in one of its slots. The registry never owns its own disposal.
///
/// Owned disposable services are released exactly once, either by an explicit
/// call to [`ServiceRegistry::dispose`] or when the last handle is dropped.
/// Note that a service holding a handle to its own registry keeps the registry
/// alive, so such a setup has to be disposed explicitly.
#[derive(Clone)]
pub struct ServiceRegistry {
    core: Arc<RegistryCore>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            core: Arc::new(RegistryCore::new()),
        }
    }

    /// Builds a new registry configured by `module`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ModuleInner`] if the module fails. Services
    /// added before the failure are released.
    pub fn init<M>(module: M) -> Result<Self, ServiceError>
    where
        M: ServiceModule,
    {
        let services = Self::new();
        module.configure(&services).context(ModuleInnerSnafu {
            module: any::type_name::<M>(),
        })?;
        Ok(services)
    }

    /// Adds `instance`, resolvable as `T`.
    ///
    /// The service is never released by the registry, even if `T` implements
    /// [`Dispose`]. Register such services with
    /// [`ServiceRegistry::add_disposable`] or [`bind`] plus
    /// [`ServiceBinding::disposable`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Disposed`] if the registry has been torn down.
    pub fn add_service<T>(&self, instance: Arc<T>) -> Result<(), ServiceError>
    where
        T: Service + ?Sized,
    {
        bind(instance).set_on(self)
    }

    /// Adds `instance` and releases it when the registry is torn down.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Disposed`] if the registry has been torn down.
    pub fn add_disposable<T>(&self, instance: Arc<T>) -> Result<(), ServiceError>
    where
        T: Dispose + ?Sized,
    {
        bind(instance).disposable().set_on(self)
    }

    /// Returns the first service compatible with `T`, or [`None`] if there
    /// isn't any. A missing service is a normal outcome.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Service + ?Sized,
    {
        self.get_self::<T>().or_else(|| self.core.get::<T>())
    }

    /// Returns the first service compatible with `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if there isn't any.
    pub fn require<T>(&self) -> Result<Arc<T>, ServiceError>
    where
        T: Service + ?Sized,
    {
        self.get::<T>().context(NotFoundSnafu {
            service: any::type_name::<T>(),
        })
    }

    pub fn contains<T>(&self) -> bool
    where
        T: Service + ?Sized,
    {
        Self::is_self::<T>() || self.core.contains::<T>()
    }

    /// Returns the number of registered services, not counting the registry
    /// itself.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Fills the empty injectable slots of `target`.
    pub fn inject_into<T>(&self, target: &mut T)
    where
        T: Inject + ?Sized,
    {
        target.inject(self);
    }

    /// Releases every owned disposable service in insertion order. A failed
    /// release doesn't stop the others, and all failures are reported
    /// together. After this call, the registry is empty and rejects new
    /// services. Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`DisposeError`] if any service fails to be released.
    pub fn dispose(&self) -> Result<(), DisposeError> {
        self.core.dispose()
    }

    pub(crate) fn push_entry(&self, entry: ServiceEntry) -> Result<(), ServiceError> {
        self.core.push(entry)
    }

    fn is_self<T>() -> bool
    where
        T: Service + ?Sized,
    {
        TypeId::of::<T>() == TypeId::of::<Self>()
    }

    fn get_self<T>(&self) -> Option<Arc<T>>
    where
        T: Service + ?Sized,
    {
        if Self::is_self::<T>() {
            let this: Box<dyn Any> = Box::new(Arc::new(self.clone()));
            this.downcast::<Arc<T>>().ok().map(|this| *this)
        } else {
            None
        }
    }
}

impl Debug for ServiceRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ServiceRegistry")
            .field("len", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ServiceError {
    #[snafu(display("could not find any service compatible with {service}"))]
    #[non_exhaustive]
    NotFound { service: &'static str },
    #[snafu(display("module {module} fails to configure the services"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: BoxError,
    },
    #[snafu(display("could not add service {service} to a disposed registry"))]
    #[non_exhaustive]
    Disposed { service: &'static str },
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::Mutex;

    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            String::from("hello")
        }
    }

    struct French;

    impl Greeter for French {
        fn greet(&self) -> String {
            String::from("bonjour")
        }
    }

    #[derive(Default)]
    struct MockDisposable {
        disposed: AtomicBool,
    }

    impl MockDisposable {
        fn disposed(&self) -> bool {
            self.disposed.load(Ordering::SeqCst)
        }
    }

    impl Dispose for MockDisposable {
        fn dispose(&self) -> Result<(), BoxError> {
            self.disposed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingDisposable;

    struct RecordingDisposable {
        id: u8,
        log: Arc<Mutex<Vec<u8>>>,
    }

    impl Dispose for RecordingDisposable {
        fn dispose(&self) -> Result<(), BoxError> {
            self.log.lock().push(self.id);
            Ok(())
        }
    }

    impl Dispose for FailingDisposable {
        fn dispose(&self) -> Result<(), BoxError> {
            Err("cannot release".into())
        }
    }

    #[derive(Default, Inject)]
    struct Consumer {
        pub text: Option<Arc<String>>,
        pub number: Option<Arc<i32>>,
        pub greeter: Option<Arc<dyn Greeter>>,
        pub services: Option<Arc<ServiceRegistry>>,
        pub(crate) restricted: Option<Arc<String>>,
        private: Option<Arc<String>>,
    }

    #[test]
    fn service_registry_get_succeeds_when_service_added() {
        let services = ServiceRegistry::new();
        services.add_service(Arc::new(String::from("text"))).unwrap();

        assert_eq!(services.get::<String>().as_deref(), Some(&String::from("text")));
        assert!(services.contains::<String>());
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn service_registry_get_returns_none_when_service_missing() {
        let services = ServiceRegistry::new();

        assert!(services.get::<String>().is_none());
        assert!(!services.contains::<String>());
        assert!(services.is_empty());
    }

    #[test]
    fn service_registry_get_succeeds_with_first_compatible_service() {
        let services = ServiceRegistry::new();
        let first = Arc::new(1i32);
        services.add_service(Arc::clone(&first)).unwrap();
        services.add_service(Arc::new(2i32)).unwrap();

        assert!(Arc::ptr_eq(&services.get::<i32>().unwrap(), &first));
    }

    #[test]
    fn service_registry_get_succeeds_for_exposed_trait_objects() {
        let services = ServiceRegistry::new();
        bind(Arc::new(English))
            .exposed_as(|english| english as Arc<dyn Greeter>)
            .set_on(&services)
            .unwrap();
        bind(Arc::new(French))
            .exposed_as(|french| french as Arc<dyn Greeter>)
            .set_on(&services)
            .unwrap();

        assert_eq!(services.get::<dyn Greeter>().unwrap().greet(), "hello");
        assert!(services.get::<French>().is_some());
    }

    #[test]
    fn service_registry_get_succeeds_when_requesting_itself() {
        let services = ServiceRegistry::new();
        services.add_service(Arc::new(42i32)).unwrap();

        let this = services.get::<ServiceRegistry>().unwrap();
        assert_eq!(this.get::<i32>().as_deref(), Some(&42));
        assert!(services.contains::<ServiceRegistry>());
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn service_registry_get_succeeds_with_itself_before_other_registries() {
        let services = ServiceRegistry::new();
        let other = ServiceRegistry::new();
        other.add_service(Arc::new(1i32)).unwrap();
        services.add_service(Arc::new(other)).unwrap();

        let found = services.get::<ServiceRegistry>().unwrap();
        assert!(found.get::<i32>().is_none());
    }

    #[test]
    fn service_registry_require_fails_when_service_missing() {
        let services = ServiceRegistry::new();

        let err = services.require::<String>().unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "could not find any service compatible with alloc::string::String"
        );
    }

    #[test]
    fn service_registry_init_succeeds() {
        struct TextModule;

        impl ServiceModule for TextModule {
            fn configure(&self, services: &ServiceRegistry) -> Result<(), BoxError> {
                services.add_service(Arc::new(String::from("configured")))?;
                Ok(())
            }
        }

        let services = ServiceRegistry::init(TextModule).unwrap();
        assert_eq!(
            services.get::<String>().as_deref().map(String::as_str),
            Some("configured")
        );
    }

    #[test]
    fn service_registry_init_fails_and_releases_services_when_module_fails() {
        let disposable = Arc::new(MockDisposable::default());

        struct BrokenModule(Arc<MockDisposable>);

        impl ServiceModule for BrokenModule {
            fn configure(&self, services: &ServiceRegistry) -> Result<(), BoxError> {
                services.add_disposable(Arc::clone(&self.0))?;
                Err("missing configuration".into())
            }
        }

        let err = ServiceRegistry::init(BrokenModule(Arc::clone(&disposable))).unwrap_err();
        assert!(matches!(err, ServiceError::ModuleInner { .. }));
        assert!(disposable.disposed());
    }

    #[test]
    fn service_registry_dispose_succeeds_respecting_ownership() {
        let disposable = Arc::new(MockDisposable::default());

        let services = ServiceRegistry::new();
        bind(Arc::clone(&disposable))
            .disposable()
            .borrowed()
            .set_on(&services)
            .unwrap();
        services.dispose().unwrap();

        assert!(!disposable.disposed());

        let next_services = ServiceRegistry::new();
        next_services.add_disposable(Arc::clone(&disposable)).unwrap();
        next_services.dispose().unwrap();

        assert!(disposable.disposed());
    }

    #[test]
    fn service_registry_dispose_succeeds_when_last_handle_dropped() {
        let disposable = Arc::new(MockDisposable::default());

        let services = ServiceRegistry::new();
        services.add_disposable(Arc::clone(&disposable)).unwrap();
        let cloned = services.clone();
        drop(services);

        assert!(!disposable.disposed());

        drop(cloned);

        assert!(disposable.disposed());
    }

    #[test]
    fn service_registry_dispose_fails_after_releasing_every_service() {
        let first = Arc::new(MockDisposable::default());
        let last = Arc::new(MockDisposable::default());

        let services = ServiceRegistry::new();
        services.add_disposable(Arc::clone(&first)).unwrap();
        services.add_disposable(Arc::new(FailingDisposable)).unwrap();
        services.add_disposable(Arc::new(FailingDisposable)).unwrap();
        services.add_disposable(Arc::clone(&last)).unwrap();

        let err = services.dispose().unwrap_err();
        assert_eq!(err.failures().len(), 2);
        assert!(first.disposed());
        assert!(last.disposed());
    }

    #[test]
    fn service_registry_dispose_succeeds_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recording = |id| {
            Arc::new(RecordingDisposable {
                id,
                log: Arc::clone(&log),
            })
        };

        let services = ServiceRegistry::new();
        services.add_disposable(recording(2)).unwrap();
        services.add_service(recording(4)).unwrap();
        services.add_disposable(recording(1)).unwrap();
        bind(recording(5))
            .disposable()
            .borrowed()
            .set_on(&services)
            .unwrap();
        services.add_disposable(recording(3)).unwrap();

        services.dispose().unwrap();

        assert_eq!(*log.lock(), vec![2, 1, 3]);
    }

    #[test]
    fn service_registry_dispose_succeeds_only_once() {
        let services = ServiceRegistry::new();
        services.add_disposable(Arc::new(FailingDisposable)).unwrap();

        assert!(services.dispose().is_err());
        assert!(services.dispose().is_ok());
        assert!(services.is_disposed());
        assert!(services.is_empty());
    }

    #[test]
    fn service_registry_add_service_fails_when_disposed() {
        let services = ServiceRegistry::new();
        services.dispose().unwrap();

        let err = services.add_service(Arc::new(42i32)).unwrap_err();
        assert!(matches!(err, ServiceError::Disposed { service: "i32", .. }));
    }

    #[test]
    fn service_registry_inject_into_succeeds_filling_public_slots() {
        let services = ServiceRegistry::new();
        services.add_service(Arc::new(String::from("text"))).unwrap();
        bind(Arc::new(English))
            .exposed_as(|english| english as Arc<dyn Greeter>)
            .set_on(&services)
            .unwrap();

        let mut consumer = Consumer::default();
        services.inject_into(&mut consumer);

        assert_eq!(consumer.text.as_deref().map(String::as_str), Some("text"));
        assert_eq!(consumer.greeter.unwrap().greet(), "hello");
        assert!(consumer.services.is_some());
    }

    #[test]
    fn service_registry_inject_into_leaves_missing_services_empty() {
        let services = ServiceRegistry::new();

        let mut consumer = Consumer::default();
        services.inject_into(&mut consumer);

        assert!(consumer.number.is_none());
        assert!(consumer.text.is_none());
    }

    #[test]
    fn service_registry_inject_into_never_touches_non_public_slots() {
        let services = ServiceRegistry::new();
        services.add_service(Arc::new(String::from("text"))).unwrap();

        let mut consumer = Consumer::default();
        services.inject_into(&mut consumer);

        assert!(consumer.restricted.is_none());
        assert!(consumer.private.is_none());
    }

    #[test]
    fn service_registry_inject_into_never_overwrites_filled_slots() {
        let services = ServiceRegistry::new();
        services.add_service(Arc::new(String::from("text"))).unwrap();
        services.add_service(Arc::new(42i32)).unwrap();

        let existing = Arc::new(String::from("existing"));
        let mut consumer = Consumer {
            text: Some(Arc::clone(&existing)),
            ..Consumer::default()
        };
        services.inject_into(&mut consumer);

        assert!(Arc::ptr_eq(consumer.text.as_ref().unwrap(), &existing));
        assert_eq!(consumer.number.as_deref(), Some(&42));
    }
}
