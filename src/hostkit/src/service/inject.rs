use crate::service::ServiceRegistry;

/// A type whose injectable slots can be filled from a [`ServiceRegistry`].
///
/// Injection is a best-effort hydration pass: a slot that already holds a
/// value is left untouched, and a slot whose service is missing stays empty
/// without being reported as an error. Usually it's implemented by
/// `#[derive(Inject)]`, which treats every `pub` field of type
/// `Option<Arc<S>>` as a slot for the service `S`:
///
/// ```
/// use std::sync::Arc;
///
/// use hostkit::service::{Inject, ServiceRegistry};
///
/// #[derive(Default, Inject)]
/// struct Greeter {
///     pub prefix: Option<Arc<String>>,
///     pub count: Option<Arc<u32>>,
///     #[inject(skip)]
///     pub ignored: Option<Arc<String>>,
///     hidden: Option<Arc<String>>,
/// }
///
/// let services = ServiceRegistry::new();
/// services.add_service(Arc::new(String::from("hello"))).unwrap();
///
/// let mut greeter = Greeter::default();
/// services.inject_into(&mut greeter);
///
/// assert_eq!(greeter.prefix.as_deref().map(String::as_str), Some("hello"));
/// assert!(greeter.count.is_none());
/// assert!(greeter.ignored.is_none());
/// assert!(greeter.hidden.is_none());
/// ```
pub trait Inject {
    /// Fills every empty slot of `self` with a compatible service from
    /// `services`, if there is one.
    fn inject(&mut self, services: &ServiceRegistry);
}
