//! Basic example of the Rabt DI container.

use rabt::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

// === Define your traits and types ===

trait Logger {
    fn log(&self, msg: &str);
}

#[derive(Default)]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(Default)]
struct Config {
    database_url: String,
    debug: bool,
}

#[derive(Default)]
struct Database {
    config: Option<Shared<Config>>,
    logger: Option<Shared<dyn Logger>>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        let logger = self.logger.as_ref().expect("wired").borrow();
        logger.log(&format!("Executing: {sql}"));

        let config = self.config.as_ref().expect("wired").borrow();
        format!("Results from {}", config.database_url)
    }
}

#[derive(Default)]
struct UserRepository {
    db: Option<Shared<Database>>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        let db = self.db.as_ref().expect("wired").borrow();
        db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

#[derive(Default)]
struct UserService {
    repo: Option<Shared<UserRepository>>,
    logger: Option<Shared<dyn Logger>>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        let logger = self.logger.as_ref().expect("wired").borrow();
        logger.log(&format!("Getting user {id}"));

        let repo = self.repo.as_ref().expect("wired").borrow();
        repo.find_user(id)
    }
}

// === Declare the injection points ===

injectable!(Config);
injectable! {
    ConsoleLogger {
        provides dyn Logger;
    }
}
injectable! {
    Database {
        inject config: Config = "";
        inject logger: dyn Logger = "";
    }
}
injectable! {
    UserRepository {
        inject db: Database = "";
    }
}
injectable! {
    UserService {
        inject repo: UserRepository = "";
        inject logger: dyn Logger = "";
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("rabt_container=debug")
        .init();

    // Register everything, then wire the whole graph
    let mut container = Container::new();
    container.register([
        Dependency::new(Rc::new(RefCell::new(Config {
            database_url: "postgres://localhost/myapp".to_string(),
            debug: true,
        }))),
        Dependency::new(Rc::new(RefCell::new(ConsoleLogger))),
        Dependency::new(Rc::new(RefCell::new(Database::default()))),
        Dependency::new(Rc::new(RefCell::new(UserRepository::default()))),
        Dependency::new(Rc::new(RefCell::new(UserService::default()))),
    ])?;

    container.resolve_all()?;
    println!("container wired: {container:?}");

    let config = container.resolve::<Config>()?;
    {
        let config = config.borrow();
        println!(
            "config: database_url={}, debug={}",
            config.database_url, config.debug
        );
    }

    let service = container.resolve::<UserService>()?;
    let result = service.borrow().get_user(42);
    println!("{result}");

    // Resolving again yields the same singleton, already wired
    let service_again = container.resolve::<UserService>()?;
    let result = service_again.borrow().get_user(7);
    println!("{result}");

    Ok(())
}
