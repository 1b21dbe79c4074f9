use std::env;
use tracing_subscriber::EnvFilter;

use bootsvc::{cli, SystemHost};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let code = cli::run(&SystemHost::new(), &args);
    std::process::exit(code);
}
