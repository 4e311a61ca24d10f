use hostkit::prelude::*;

#[derive(Inject)]
pub struct Marker;

fn main() {
    let services = ServiceRegistry::new();
    services.inject_into(&mut Marker);
}
