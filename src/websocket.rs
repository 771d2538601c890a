use std::collections::HashMap;

use tracing::debug;

/// Exact endpoint to handler table for upgrade requests.
pub struct WebSocketRegistry<W>(HashMap<String, W>);

impl<W> WebSocketRegistry<W> {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn add_endpoint(&mut self, endpoint: &str, handler: W) {
        let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
        debug!(endpoint, "map websocket endpoint");
        self.0.insert(endpoint.to_owned(), handler);
    }

    pub fn lookup(&self, path: &str) -> Option<&W> {
        self.0.get(path.strip_prefix('/').unwrap_or(path))
    }
}

impl<W> Default for WebSocketRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}
