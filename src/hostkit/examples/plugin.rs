use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use hostkit::prelude::*;

fn main() {
    let services = ServiceRegistry::init(PluginModule::new("greeter")).unwrap();

    let mut commands = CommandRegistrar::with_services(ConsoleHost::default(), services.clone());
    commands.add_module::<GreeterCommands>();

    let windows = WindowManager::with_services(services.clone());
    windows.add_window::<GreetingWindow>(false);
    windows.add_window::<MainWindow>(true);

    for frame in 0..3 {
        println!("-- frame {frame}");
        windows.draw_pass().unwrap();
    }

    commands.host().issue("/greet", "Ferris");
    commands.host().issue("/hi", "Ferris");

    commands.dispose().unwrap();
    windows.dispose().unwrap();
    services.dispose().unwrap();
}

struct PluginModule {
    plugin_name: &'static str,
}

impl PluginModule {
    fn new(plugin_name: &'static str) -> Self {
        Self { plugin_name }
    }
}

impl ServiceModule for PluginModule {
    fn configure(&self, services: &ServiceRegistry) -> Result<(), Box<dyn Error + Send + Sync>> {
        bind(Arc::new(ConsoleLogger {
            plugin_name: self.plugin_name,
        }))
        .exposed_as(|logger| logger as Arc<dyn Logger>)
        .disposable()
        .set_on(services)?;

        services.add_service(Arc::new(Greeting("Hello")))?;
        Ok(())
    }
}

pub trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

struct ConsoleLogger {
    plugin_name: &'static str,
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.plugin_name, message);
    }
}

impl Dispose for ConsoleLogger {
    fn dispose(&self) -> Result<(), BoxError> {
        self.log("Goodbye!");
        Ok(())
    }
}

pub struct Greeting(&'static str);

#[derive(Inject)]
pub struct MainWindow {
    pub logger: Option<Arc<dyn Logger>>,
    control: WindowControl,
    frames: u32,
}

impl Window for MainWindow {
    fn draw(&mut self, visible: &mut bool) -> Result<(), WindowError> {
        self.frames += 1;
        if let Some(logger) = &self.logger {
            logger.log(&format!("main window, frame {}", self.frames));
        }
        match self.frames {
            1 => self.control.open::<GreetingWindow>(),
            2 => {
                *visible = false;
                self.control.close::<GreetingWindow>()
            }
            _ => Ok(()),
        }
    }
}

impl ManagedWindow for MainWindow {
    fn create(control: WindowControl) -> Self {
        Self {
            logger: None,
            control,
            frames: 0,
        }
    }
}

#[derive(Inject)]
pub struct GreetingWindow {
    pub logger: Option<Arc<dyn Logger>>,
    pub greeting: Option<Arc<Greeting>>,
}

impl Window for GreetingWindow {
    fn draw(&mut self, _visible: &mut bool) -> Result<(), WindowError> {
        if let (Some(logger), Some(greeting)) = (&self.logger, &self.greeting) {
            logger.log(&format!("{}, window!", greeting.0));
        }
        Ok(())
    }
}

impl ManagedWindow for GreetingWindow {
    fn create(_control: WindowControl) -> Self {
        Self {
            logger: None,
            greeting: None,
        }
    }
}

#[derive(Default, Inject)]
pub struct GreeterCommands {
    pub logger: Option<Arc<dyn Logger>>,
    pub greeting: Option<Arc<Greeting>>,
}

impl CommandModule for GreeterCommands {
    fn commands(self: Arc<Self>) -> Vec<Command> {
        vec![Command::new("/greet", move |_: &str, name: &str| {
            if let (Some(logger), Some(greeting)) = (&self.logger, &self.greeting) {
                logger.log(&format!("{}, {name}!", greeting.0));
            }
        })
        .alias("/hi")
        .help("Greets someone by name.")]
    }
}

#[derive(Default)]
struct ConsoleHost {
    commands: HashMap<String, CommandInfo>,
}

impl ConsoleHost {
    fn issue(&self, name: &str, arguments: &str) {
        match self.commands.get(name) {
            Some(info) => info.invoke(name, arguments),
            None => eprintln!("unknown command {name}"),
        }
    }
}

impl CommandHost for ConsoleHost {
    fn add_handler(&mut self, name: &str, info: CommandInfo) -> bool {
        self.commands.insert(name.to_string(), info).is_none()
    }

    fn remove_handler(&mut self, name: &str) -> bool {
        self.commands.remove(name).is_some()
    }
}
