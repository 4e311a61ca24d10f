use std::sync::Arc;

use hostkit::prelude::*;

#[derive(Inject)]
pub struct Holder<T: Send + Sync + 'static> {
    pub value: Option<Arc<T>>,
    pub label: Option<Arc<String>>,
}

fn main() {
    let services = ServiceRegistry::new();
    services.add_service(Arc::new(42u32)).unwrap();

    let mut holder = Holder::<u32> {
        value: None,
        label: None,
    };
    services.inject_into(&mut holder);

    assert_eq!(holder.value.as_deref(), Some(&42));
    assert!(holder.label.is_none());
}
