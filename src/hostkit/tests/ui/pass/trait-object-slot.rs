use std::sync::Arc;

use hostkit::prelude::*;

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        7
    }
}

#[derive(Default, Inject)]
pub struct Scheduler {
    pub clock: Option<Arc<dyn Clock>>,
    pub services: Option<Arc<ServiceRegistry>>,
    #[inject(skip)]
    pub fallback: Option<Arc<dyn Clock>>,
    pub retries: u32,
}

fn main() {
    let services = ServiceRegistry::new();
    bind(Arc::new(FixedClock))
        .exposed_as(|clock| clock as Arc<dyn Clock>)
        .set_on(&services)
        .unwrap();

    let mut scheduler = Scheduler::default();
    services.inject_into(&mut scheduler);

    assert_eq!(scheduler.clock.as_ref().map(|clock| clock.now()), Some(7));
    assert!(scheduler.services.is_some());
    assert!(scheduler.fallback.is_none());
    assert_eq!(scheduler.retries, 0);
}
