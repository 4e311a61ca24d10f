use std::any::{self, Any};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::dispose::BoxError;
use crate::service::Service;

type Disposer = Box<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

/// A registered service instance, together with every type it can be looked
/// up as and whether the registry owns its disposal.
pub struct ServiceEntry {
    type_name: &'static str,
    views: Vec<Box<dyn Any + Send + Sync>>,
    disposer: Option<Disposer>,
    owns_disposal: bool,
}

impl ServiceEntry {
    pub fn new<T>(instance: Arc<T>) -> Self
    where
        T: Service + ?Sized,
    {
        Self {
            type_name: any::type_name::<T>(),
            views: vec![Box::new(instance)],
            disposer: None,
            owns_disposal: true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn add_view<U>(&mut self, view: Arc<U>)
    where
        U: Service + ?Sized,
    {
        self.views.push(Box::new(view));
    }

    pub fn set_disposer(&mut self, disposer: Disposer) {
        self.disposer = Some(disposer);
    }

    pub fn set_owns_disposal(&mut self, owns_disposal: bool) {
        self.owns_disposal = owns_disposal;
    }

    pub fn owns_disposal(&self) -> bool {
        self.owns_disposal
    }

    pub fn view<T>(&self) -> Option<Arc<T>>
    where
        T: Service + ?Sized,
    {
        self.views
            .iter()
            .find_map(|view| view.downcast_ref::<Arc<T>>())
            .map(Arc::clone)
    }

    pub fn is_compatible<T>(&self) -> bool
    where
        T: Service + ?Sized,
    {
        self.views.iter().any(|view| view.is::<Arc<T>>())
    }

    /// Releases the instance if the entry is responsible for it. Returns
    /// [`None`] if there is nothing to release.
    pub fn release(&self) -> Option<Result<(), BoxError>> {
        if self.owns_disposal {
            self.disposer.as_ref().map(|dispose| dispose())
        } else {
            None
        }
    }
}

impl Debug for ServiceEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ServiceEntry")
            .field("type_name", &self.type_name)
            .field("views", &self.views.len())
            .field("disposable", &self.disposer.is_some())
            .field("owns_disposal", &self.owns_disposal)
            .finish()
    }
}
