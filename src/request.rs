use std::{
    collections::HashMap,
    io::{BufRead, BufReader, ErrorKind, Read, Take},
};

use thiserror::Error;
use tracing::debug;

use crate::router::percent_decode;

const REQUEST_LINE_LIMIT: u64 = 1024;
const HEADERS_LIMIT: u64 = 8 * 1024;
const BODY_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Debug)]
struct RequestLine<'a> {
    line: &'a str,
}

impl<'a> RequestLine<'a> {
    fn new(line: &'a str) -> Self {
        Self { line }
    }

    fn part(&self, idx: usize) -> &'a str {
        self.line.split(' ').nth(idx).unwrap_or_default()
    }

    fn http_method(&self) -> &'a str {
        self.part(0)
    }

    fn request_target(&self) -> &'a str {
        self.part(1)
    }

    fn http_version(&self) -> &'a str {
        self.part(2)
    }
}

#[derive(Debug)]
pub struct Request {
    request_line: String,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
    path_values: HashMap<String, String>,
    regex_groups: Vec<String>,
}

impl Request {
    pub fn new(
        request_line: String,
        headers: HashMap<String, String>,
        body: Option<Vec<u8>>,
    ) -> Self {
        Self {
            request_line,
            headers,
            body,
            path_values: HashMap::new(),
            regex_groups: vec![],
        }
    }

    pub fn get_http_method(&self) -> &str {
        RequestLine::new(&self.request_line).http_method()
    }

    pub fn get_request_target(&self) -> &str {
        RequestLine::new(&self.request_line).request_target()
    }

    pub fn get_http_version(&self) -> &str {
        RequestLine::new(&self.request_line).http_version()
    }

    /// The request target without query string and fragment.
    pub fn get_path(&self) -> &str {
        let target = self.get_request_target();
        let end = target.find(['?', '#']).unwrap_or(target.len());
        &target[..end]
    }

    /// [`Request::get_path`] with percent-escapes decoded.
    pub fn get_decoded_path(&self) -> String {
        percent_decode(self.get_path())
    }

    pub fn get_query(&self) -> Option<&str> {
        let target = self.get_request_target();
        let (_, query) = target.split_once('?')?;
        Some(query.split('#').next().unwrap_or_default())
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(|v| v.as_str())
    }

    pub fn get_body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn wants_close(&self) -> bool {
        self.get_header("connection")
            .is_some_and(|v| v.split(',').any(|v| v.trim().eq_ignore_ascii_case("close")))
    }

    /// A `GET` over HTTP/1.1 asking to switch to the websocket protocol.
    pub fn is_websocket_upgrade(&self) -> bool {
        self.get_http_method().eq_ignore_ascii_case("GET")
            && self.get_http_version() == "HTTP/1.1"
            && self
                .get_header("upgrade")
                .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
    }

    pub fn get_path_value(&self, name: &str) -> Option<&str> {
        self.path_values.get(name).map(|v| v.as_str())
    }

    pub fn get_path_values(&self) -> &HashMap<String, String> {
        &self.path_values
    }

    pub fn set_path_values(&mut self, path_values: HashMap<String, String>) {
        self.path_values = path_values;
    }

    pub fn get_regex_groups(&self) -> &[String] {
        &self.regex_groups
    }

    pub fn set_regex_groups(&mut self, regex_groups: Vec<String>) {
        self.regex_groups = regex_groups;
    }
}

#[derive(Error, Debug)]
#[error("end of file")]
pub struct EndOfFile;

#[derive(Error, Debug)]
#[error("invalid request")]
pub struct InvalidRequest;

pub struct RequestReader<R> {
    buf_reader: Take<BufReader<R>>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(r: R) -> Self {
        Self {
            buf_reader: BufReader::new(r).take(u64::MAX),
        }
    }

    fn read_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        self.buf_reader.read_line(&mut line)?;
        Ok(line.strip_suffix("\r\n").ok_or(InvalidRequest)?.to_owned())
    }

    pub fn read(&mut self) -> anyhow::Result<Request> {
        let mut request_line = String::new();
        self.buf_reader.set_limit(REQUEST_LINE_LIMIT);
        let n = self.buf_reader.read_line(&mut request_line)?;
        if n == 0 {
            Err(EndOfFile)?
        }
        request_line = request_line
            .strip_suffix("\r\n")
            .ok_or(InvalidRequest)?
            .to_owned();

        if request_line.split(' ').count() != 3 {
            Err(InvalidRequest)?
        }

        debug!(?request_line);

        let mut headers = HashMap::new();
        self.buf_reader.set_limit(HEADERS_LIMIT);
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                break;
            }
            let (k, v) = line.split_once(':').ok_or(InvalidRequest)?;
            headers.insert(k.trim().to_lowercase(), v.trim().to_owned());
        }

        let mut body = None;
        if let Some(content_length) = headers.get("content-length") {
            let content_length: usize = content_length.parse().map_err(|_| InvalidRequest)?;
            if content_length > BODY_LIMIT {
                Err(InvalidRequest)?
            }
            self.buf_reader.set_limit(content_length as u64);
            let mut buf = vec![0; content_length];
            if let Err(err) = self.buf_reader.read_exact(&mut buf) {
                if err.kind() == ErrorKind::UnexpectedEof {
                    Err(InvalidRequest)?
                } else {
                    Err(err)?
                }
            }
            body = Some(buf);
        }

        Ok(Request::new(request_line, headers, body))
    }
}
