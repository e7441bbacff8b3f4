use envbind::{Bind, Url};
use std::time::Duration;

#[derive(Bind, Default, Debug)]
pub struct ServiceConfig {
    #[env = "SERVICE_NAME,required"]
    #[validate = "min=3"]
    pub name: String,

    #[env = "SERVICE_PORT"]
    #[envdef = "8080"]
    #[validate = "min=1,max=65535"]
    pub port: u16,

    #[env = "SERVICE_MODE"]
    #[envdef = "dev"]
    #[validate = "oneof=dev|staging|prod"]
    pub mode: String,

    #[env = "SERVICE_TIMEOUT"]
    #[envdef = "5s"]
    #[validate = "min=100ms,max=1m"]
    pub timeout: Duration,

    #[env = "SERVICE_PEERS"]
    #[envsep = ";"]
    pub peers: Vec<String>,

    #[env = "SERVICE_UPSTREAM"]
    pub upstream: Option<Url>,
}

fn main() {
    match std::env::args().nth(1) {
        Some(arg) => match arg.as_str() {
            "dump" => dump(std::env::args().nth(2)),
            "expand" => expand(std::env::args().nth(2)),
            "check" => check(),
            "fields" => fields(),
            _ => println!(
                "unknown arg: {}. Available: dump, expand, check, fields",
                arg
            ),
        },
        None => {
            println!("Usage: envbind-cli [command]");
            println!("Commands:");
            println!("  dump [FILE]  - Load an env file and print the redacted environment");
            println!("  expand TEXT  - Expand ${{VAR}} references in TEXT");
            println!("  check        - Bind ServiceConfig and report every failure");
            println!("  fields       - Show the ServiceConfig field table");
        }
    };
}

fn dump(file: Option<String>) {
    let loaded = match &file {
        Some(path) => envbind::load_from_path(path).map(Some),
        None => envbind::load_once(&envbind::DEFAULT_PATHS).map(|_| None),
    };
    match loaded {
        Ok(Some(count)) => eprintln!("loaded {} variable(s)", count),
        Ok(None) => {}
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }

    for (key, value) in envbind::dump_redacted() {
        println!("{}={}", key, value);
    }
}

fn expand(text: Option<String>) {
    match text {
        Some(text) => println!("{}", envbind::expand(&text, &envbind::ProcessEnv)),
        None => eprintln!("expand needs TEXT"),
    }
}

fn check() {
    envbind::load_once(&envbind::DEFAULT_PATHS).ok();
    match ServiceConfig::load_or_error() {
        Ok(config) => {
            println!("Config loaded successfully!");
            println!("  name: {}", config.name);
            println!("  port: {}", config.port);
            println!("  mode: {}", config.mode);
            println!("  timeout: {:?}", config.timeout);
            println!("  peers: {:?}", config.peers);
            match &config.upstream {
                Some(url) => println!("  upstream: {}", url),
                None => println!("  upstream: -"),
            }
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn fields() {
    println!("ServiceConfig fields:");
    for d in ServiceConfig::descriptors() {
        println!("  {}:", d.field);
        println!("    env: {}", d.key);
        println!("    required: {}", d.required);
        if let Some(default) = d.default_text() {
            println!("    default: {}", default);
        }
        if let Some(rule) = d.rule_text() {
            println!("    validate: {}", rule);
        }
    }
}
