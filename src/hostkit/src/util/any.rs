use std::any::{self, Any};
use std::sync::Arc;

pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>
    where
        Self: Send + Sync;

    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>
    where
        Self: Send + Sync,
    {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
}

pub trait DowncastArc {
    fn downcast_arc<T: Any + Send + Sync>(self) -> Option<Arc<T>>;
}

impl<S> DowncastArc for Arc<S>
where
    S: AsAny + Send + Sync + ?Sized,
{
    fn downcast_arc<T: Any + Send + Sync>(self) -> Option<Arc<T>> {
        if (*self).as_any().is::<T>() {
            self.into_any_arc().downcast::<T>().ok()
        } else {
            None
        }
    }
}
