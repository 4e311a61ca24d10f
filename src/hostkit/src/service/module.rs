use crate::dispose::BoxError;
use crate::service::ServiceRegistry;

/// A unit of configuration which installs a group of services.
///
/// Modules are usually composed by the host when building its registry with
/// [`ServiceRegistry::init`]. Tuples of modules configure the registry one
/// after another and stop at the first failure.
pub trait ServiceModule {
    /// Adds services to `services`.
    ///
    /// # Errors
    ///
    /// Returns an error if the module could not set up its services, e.g. a
    /// resource it wraps is unavailable.
    fn configure(&self, services: &ServiceRegistry) -> Result<(), BoxError>;
}

macro_rules! impl_service_module_for_tuples {
    ($($module:ident),+) => {
        impl<$($module),+> ServiceModule for ($($module,)+)
        where
            $($module: ServiceModule,)+
        {
            #[allow(non_snake_case)]
            fn configure(&self, services: &ServiceRegistry) -> Result<(), BoxError> {
                let ($($module,)+) = self;
                $($module.configure(services)?;)+
                Ok(())
            }
        }
    };
}

impl_service_module_for_tuples!(A, B);
impl_service_module_for_tuples!(A, B, C);
impl_service_module_for_tuples!(A, B, C, D);
