use clap::Parser;
use dispatch_http_server::{config::Config, run};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();
    run(config)
}
