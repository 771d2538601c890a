use tracing::{debug, info};

use crate::{
    file_server,
    filter::{Filter, FilterChain, Flow},
    method::{route_method, HttpMethod},
    request::Request,
    response_writer::ResponseWriter,
    router::{Resolution, RouteError, Router},
    server::Handler,
    status::ReasonPhrase,
    websocket::WebSocketRegistry,
};

pub type BoxHandler = Box<dyn Handler + Send + Sync>;
pub type BoxFilter = Box<dyn Filter + Send + Sync>;

/// Adds a group of routes, filters or resources to an [`AppBuilder`].
pub type Registrar = fn(&mut AppBuilder);

/// Everything a server dispatches against. Read-only once built.
pub struct App {
    router: Router<BoxHandler>,
    filters: FilterChain<BoxFilter>,
    websockets: WebSocketRegistry<BoxHandler>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder {
            app: App {
                router: Router::new(),
                filters: FilterChain::new(),
                websockets: WebSocketRegistry::new(),
            },
        }
    }

    pub fn router(&self) -> &Router<BoxHandler> {
        &self.router
    }

    fn handle_upgrade(&self, w: &mut ResponseWriter, r: &mut Request) {
        match self.websockets.lookup(&r.get_decoded_path()) {
            Some(handler) => handler.handle(w, r),
            None => w.set_reason_phrase(ReasonPhrase::NotFound),
        }
    }
}

impl Handler for App {
    fn handle(&self, w: &mut ResponseWriter, r: &mut Request) {
        if r.is_websocket_upgrade() {
            self.handle_upgrade(w, r);
            return;
        }

        let Ok(http_method) = HttpMethod::parse(r.get_http_method()) else {
            w.set_reason_phrase(ReasonPhrase::BadRequest);
            return;
        };

        for filter in self.filters.filters_for(r.get_path()) {
            if filter.filter(w, r) == Flow::Halt {
                info!("halted by filter");
                return;
            }
        }

        match self.router.resolve(http_method, r.get_path()) {
            Resolution::Found(m) => {
                debug!("match: {}", m.pattern);
                r.set_path_values(m.path_values);
                r.set_regex_groups(m.regex_groups);
                m.handler.handle(w, r);
            }
            Resolution::Static(file) => file_server::serve_static(w, &file),
            Resolution::NotFound => w.set_reason_phrase(ReasonPhrase::NotFound),
        }
    }
}

/// Collects registrations before serving starts.
///
/// Registration failures are startup bugs, so every method here panics on an
/// invalid method name or regular expression.
pub struct AppBuilder {
    app: App,
}

impl AppBuilder {
    /// Adds a literal or `{name}` templated route. An empty `method` answers any method.
    pub fn route(
        &mut self,
        method: &str,
        template: &str,
        handler: impl Handler + Send + Sync + 'static,
    ) -> &mut Self {
        let res = route_method(method)
            .map_err(RouteError::from)
            .and_then(|m| self.app.router.add_route(m, template, Box::new(handler)));
        fatal(res);
        self
    }

    /// Adds a route matched by a regular expression against the raw request path.
    pub fn regexp_route(
        &mut self,
        method: &str,
        regex: &str,
        handler: impl Handler + Send + Sync + 'static,
    ) -> &mut Self {
        let res = route_method(method)
            .map_err(RouteError::from)
            .and_then(|m| self.app.router.add_regexp_route(m, regex, Box::new(handler)));
        fatal(res);
        self
    }

    pub fn filter(
        &mut self,
        pattern: &str,
        filter: impl Filter + Send + Sync + 'static,
    ) -> &mut Self {
        fatal(self.app.filters.add_filter(pattern, Box::new(filter)));
        self
    }

    pub fn resource(&mut self, prefix: &str, directory: &str) -> &mut Self {
        self.app.router.resources_mut().add_resource(prefix, directory);
        self
    }

    pub fn websocket(
        &mut self,
        endpoint: &str,
        handler: impl Handler + Send + Sync + 'static,
    ) -> &mut Self {
        self.app.websockets.add_endpoint(endpoint, Box::new(handler));
        self
    }

    pub fn register(&mut self, registrar: Registrar) -> &mut Self {
        registrar(self);
        self
    }

    pub fn build(self) -> App {
        self.app
    }
}

fn fatal(res: Result<(), RouteError>) {
    if let Err(err) = res {
        panic!("registration failed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs::File, io::Write, thread};

    use reqwest::blocking::Client;
    use tempdir::TempDir;

    use crate::{
        filter::Flow, method::HttpMethod, request::Request, response_writer::ResponseWriter,
        router::Resolution, server::{Handler, Server}, status::ReasonPhrase,
    };

    use super::{App, AppBuilder};

    fn run(app: &App, request_line: &str, headers: &[(&str, &str)]) -> ResponseWriter {
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect::<HashMap<_, _>>();
        let mut r = Request::new(request_line.to_owned(), headers, None);
        let mut w = ResponseWriter::new_empty();
        app.handle(&mut w, &mut r);
        w
    }

    fn body(w: &ResponseWriter) -> &str {
        std::str::from_utf8(w.get_body()).unwrap()
    }

    fn echo_params(w: &mut ResponseWriter, r: &mut Request) {
        let mut values: Vec<_> = r
            .get_path_values()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        values.sort();
        values.extend(r.get_regex_groups().iter().cloned());
        w.set_reason_phrase(ReasonPhrase::OK);
        w.set_body_str(&values.join(","));
    }

    fn hello(w: &mut ResponseWriter, _: &mut Request) {
        w.set_reason_phrase(ReasonPhrase::OK);
        w.set_body_str("hello");
    }

    fn users(b: &mut AppBuilder) {
        b.route("GET", "/user/{id}", echo_params)
            .route("get", "/a/{x}/{y}", echo_params)
            .regexp_route("GET", r"^/files/(\d+)$", echo_params);
    }

    #[test]
    fn test_dispatch() {
        let mut b = App::builder();
        b.route("GET", "/hello", hello).register(users);
        let app = b.build();

        let w = run(&app, "GET /hello HTTP/1.1", &[]);
        assert_eq!(w.get_status_code(), Some(200));
        assert_eq!(body(&w), "hello");

        let w = run(&app, "GET /user/42?x=1 HTTP/1.1", &[]);
        assert_eq!(body(&w), "id=42");

        let w = run(&app, "GET /a/1/2 HTTP/1.1", &[]);
        assert_eq!(body(&w), "x=1,y=2");

        let w = run(&app, "GET /files/99 HTTP/1.1", &[]);
        assert_eq!(body(&w), "99");

        let w = run(&app, "POST /hello HTTP/1.1", &[]);
        assert_eq!(w.get_status_code(), Some(404));

        let w = run(&app, "BREW /hello HTTP/1.1", &[]);
        assert_eq!(w.get_status_code(), Some(400));
    }

    #[test]
    fn test_dispatch_encoded_literal_path() {
        let mut b = App::builder();
        b.route("GET", "/café", hello)
            .route("GET", "/hello world", hello)
            .websocket("/chat room", |w: &mut ResponseWriter, _: &mut Request| {
                w.set_reason_phrase(ReasonPhrase::SwitchingProtocols);
            });
        let app = b.build();

        let w = run(&app, "GET /caf%C3%A9 HTTP/1.1", &[]);
        assert_eq!(body(&w), "hello");

        let w = run(&app, "GET /hello%20world?x=1 HTTP/1.1", &[]);
        assert_eq!(body(&w), "hello");

        let w = run(&app, "GET /chat%20room HTTP/1.1", &[("Upgrade", "websocket")]);
        assert_eq!(w.get_status_code(), Some(101));
    }

    #[test]
    fn test_wildcard_route() {
        let mut b = App::builder();
        b.route("", "/ping", hello);
        let app = b.build();

        let w = run(&app, "DELETE /ping HTTP/1.1", &[]);
        assert_eq!(body(&w), "hello");
        assert!(matches!(
            app.router().resolve(HttpMethod::Options, "/ping"),
            Resolution::Found(_)
        ));
    }

    #[test]
    #[should_panic(expected = "invalid http method")]
    fn test_invalid_method_is_fatal() {
        App::builder().route("FETCH", "/x", hello);
    }

    #[test]
    #[should_panic(expected = "invalid regex")]
    fn test_invalid_regex_is_fatal() {
        App::builder().regexp_route("GET", r"^/(\d+$", hello);
    }

    #[test]
    fn test_filters_run_in_order() {
        let mut b = App::builder();
        b.route("GET", "/api/items", |w: &mut ResponseWriter, _: &mut Request| {
            let trail = w.get_header("X-Trail").unwrap_or_default().to_owned();
            w.add_header("X-Trail", &format!("{}handler", trail));
        })
        .filter(r"/api/", |w: &mut ResponseWriter, _: &mut Request| {
            w.add_header("X-Trail", "api,");
            Flow::Continue
        })
        .filter(r"/", |w: &mut ResponseWriter, _: &mut Request| {
            let trail = w.get_header("X-Trail").unwrap_or_default().to_owned();
            w.add_header("X-Trail", &format!("{}all,", trail));
            Flow::Continue
        });
        let app = b.build();

        let w = run(&app, "GET /api/items HTTP/1.1", &[]);
        assert_eq!(w.get_header("X-Trail"), Some("api,all,handler"));
    }

    #[test]
    fn test_filter_halts() {
        let mut b = App::builder();
        b.route("", "/admin/panel", hello)
            .filter(r"/admin", |w: &mut ResponseWriter, r: &mut Request| {
                if r.get_header("authorization").is_some() {
                    return Flow::Continue;
                }
                w.set_reason_phrase(ReasonPhrase::Unauthorized);
                Flow::Halt
            });
        let app = b.build();

        let w = run(&app, "GET /admin/panel HTTP/1.1", &[]);
        assert_eq!(w.get_status_code(), Some(401));
        assert!(w.get_body().is_empty());

        let w = run(&app, "GET /admin/panel HTTP/1.1", &[("Authorization", "x")]);
        assert_eq!(body(&w), "hello");
    }

    #[test]
    fn test_websocket_upgrade() {
        let mut b = App::builder();
        b.route("GET", "/chat", hello)
            .websocket("/chat", |w: &mut ResponseWriter, _: &mut Request| {
                w.set_reason_phrase(ReasonPhrase::SwitchingProtocols);
            });
        let app = b.build();

        let w = run(&app, "GET /chat HTTP/1.1", &[("Upgrade", "websocket")]);
        assert_eq!(w.get_status_code(), Some(101));

        let w = run(&app, "GET /other HTTP/1.1", &[("Upgrade", "websocket")]);
        assert_eq!(w.get_status_code(), Some(404));

        let w = run(&app, "GET /chat HTTP/1.1", &[]);
        assert_eq!(body(&w), "hello");
    }

    #[test]
    fn test_serve_over_tcp() {
        let tmp_dir = TempDir::new("assets").unwrap();
        let mut file = File::create(tmp_dir.path().join("app.js")).unwrap();
        write!(file, "console.log(1)").unwrap();
        let dir = tmp_dir.path().to_str().unwrap().to_owned();

        let mut b = App::builder();
        b.route("GET", "/hello", hello)
            .register(users)
            .resource("/assets/*", &dir);
        let server = Server::bind("localhost:0").unwrap();
        let addr = server.local_addr().unwrap();
        let _handle = server.start(b.build()).unwrap();

        let client = Client::new();
        let get = |path: &str| {
            client
                .get(format!("http://{}{}", addr, path))
                .send()
                .unwrap()
        };

        let resp = get("/hello");
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().unwrap(), "hello");

        let resp = get("/user/7");
        assert_eq!(resp.text().unwrap(), "id=7");

        let resp = get("/assets/app.js");
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/javascript"
        );
        assert_eq!(resp.text().unwrap(), "console.log(1)");

        let resp = get("/assets/missing.js");
        assert_eq!(resp.status(), 404);

        let resp = get("/nowhere");
        assert_eq!(resp.status(), 404);

        let handles: Vec<_> = (0..5)
            .map(|i| {
                thread::spawn(move || {
                    let url = format!("http://{}/a/{}/{}", addr, i, i + 1);
                    let body = reqwest::blocking::get(url).unwrap().text().unwrap();
                    assert_eq!(body, format!("x={},y={}", i, i + 1));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
