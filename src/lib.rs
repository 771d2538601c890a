use std::time::Duration;

use app::{App, AppBuilder};
use config::Config;
use request::Request;
use response_writer::ResponseWriter;
use server::Server;
use status::ReasonPhrase;
use tracing::info;

pub mod app;
pub mod config;
mod file_server;
pub mod filter;
pub mod method;
pub mod request;
pub mod resource;
pub mod response_writer;
pub mod router;
pub mod server;
pub mod status;
pub mod websocket;

fn home(w: &mut ResponseWriter, _: &mut Request) {
    w.set_reason_phrase(ReasonPhrase::OK);
    w.set_body(b"<h1>It works</h1>".to_vec(), "text/html");
}

fn ping(w: &mut ResponseWriter, _: &mut Request) {
    w.set_reason_phrase(ReasonPhrase::OK);
    w.set_body_str("pong");
}

fn builtin_routes(b: &mut AppBuilder) {
    b.route("GET", "/", home).route("", "/ping", ping);
}

pub fn build_app(config: &Config) -> App {
    let mut builder = App::builder();
    builder.register(builtin_routes);
    for (prefix, dir) in &config.resources {
        builder.resource(prefix, dir);
    }
    builder.build()
}

pub fn run(config: Config) -> anyhow::Result<()> {
    let app = build_app(&config);
    let server = Server::bind(&config.bind)?
        .with_read_timeout(Some(Duration::from_secs(config.read_timeout_secs)));
    info!(addr = %server.local_addr()?, "listening");
    server.serve(&app);
    Ok(())
}
