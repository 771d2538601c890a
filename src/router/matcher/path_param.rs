use tracing::debug;

use crate::router::pattern::Template;

use super::Match;

/// Templated routes, tried in registration order.
pub struct PathParam<H>(Vec<(Template, H)>);

impl<H> PathParam<H> {
    pub fn new() -> Self {
        Self(vec![])
    }

    /// A template that compiles to an already registered pattern takes over
    /// that route's position.
    pub fn add_route(&mut self, template: Template, handler: H) {
        debug!(pattern = template.as_str(), segments = ?template.segments(), "add route");
        match self
            .0
            .iter_mut()
            .find(|(t, _)| t.as_str() == template.as_str())
        {
            Some(entry) => *entry = (template, handler),
            None => self.0.push((template, handler)),
        }
    }

    pub fn pattern_match(&self, path: &str) -> Option<Match<'_, H>> {
        for (template, handler) in &self.0 {
            let path_values = template.path_values(path);
            debug!(
                pattern = template.as_str(),
                path,
                matched = path_values.is_some()
            );
            if let Some(path_values) = path_values {
                return Some(Match::new(template.as_str(), handler).with_path_values(path_values));
            }
        }
        None
    }
}
