use clap::Parser;
use tracing::Level;

/// Serves the built-in routes plus any mapped static resource directories.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:9090")]
    pub bind: String,

    /// Static resource mapping, e.g. `/assets/*=./public`. Repeatable.
    #[arg(long = "resource", value_name = "PREFIX=DIR", value_parser = parse_resource)]
    pub resources: Vec<(String, String)>,

    /// Seconds an idle connection is kept open
    #[arg(long, default_value_t = 10)]
    pub read_timeout_secs: u64,

    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

fn parse_resource(s: &str) -> Result<(String, String), String> {
    let (prefix, dir) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PREFIX=DIR, got {:?}", s))?;
    if dir.is_empty() {
        return Err(format!("empty directory in {:?}", s));
    }
    Ok((prefix.to_owned(), dir.to_owned()))
}
