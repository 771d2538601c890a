use crate::status::ReasonPhrase;

#[derive(Debug)]
pub struct ResponseWriter {
    status_code: Option<u16>,
    reason_phrase: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new_empty() -> Self {
        Self {
            status_code: None,
            reason_phrase: None,
            headers: vec![],
            body: vec![],
        }
    }

    pub fn get_status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn set_status_code(&mut self, status_code: u16) {
        self.status_code = Some(status_code);
        self.reason_phrase = ReasonPhrase::from_code(status_code).map(|r| r.to_string());
    }

    pub fn set_reason_phrase(&mut self, reason_phrase: ReasonPhrase) {
        self.status_code = Some(reason_phrase.code());
        self.reason_phrase = Some(reason_phrase.to_string());
    }

    /// Sets `k`, replacing an earlier value with the same name.
    pub fn add_header(&mut self, k: &str, v: &str) {
        if let Some(entry) = self
            .headers
            .iter_mut()
            .find(|entry| entry.0.eq_ignore_ascii_case(k))
        {
            entry.1 = v.to_owned();
        } else {
            self.headers.push((k.to_owned(), v.to_owned()));
        }
    }

    pub fn get_header(&self, k: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|entry| entry.0.eq_ignore_ascii_case(k))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: Vec<u8>, content_type: &str) {
        self.body = body;
        self.add_header("Content-Type", content_type);
    }

    pub fn set_body_str(&mut self, body: &str) {
        self.set_body(body.as_bytes().to_vec(), "text/plain");
    }

    /// Serialises the response. A writer nobody set a status on answers `200 OK`.
    pub fn write(mut self) -> Vec<u8> {
        let status_code = self.status_code.unwrap_or(ReasonPhrase::OK.code());
        let mut status_line = format!("HTTP/1.1 {}", status_code);
        match (&self.reason_phrase, self.status_code) {
            (Some(reason_phrase), _) => status_line = format!("{} {}", status_line, reason_phrase),
            (None, None) => status_line = format!("{} {}", status_line, ReasonPhrase::OK),
            (None, Some(_)) => {}
        }
        status_line.push_str("\r\n");

        let content_length = self.body.len().to_string();
        self.add_header("Content-Length", &content_length);

        let mut headers = self
            .headers
            .iter()
            .map(|(k, v)| format!("{}: {}\r\n", k, v))
            .collect::<String>();
        headers.push_str("\r\n");

        let mut resp = vec![];
        resp.extend(status_line.bytes());
        resp.extend(headers.bytes());
        resp.extend(self.body);
        resp
    }
}
