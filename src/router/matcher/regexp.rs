use regex::Regex;
use tracing::debug;

use crate::router::pattern::percent_decode;

use super::Match;

/// Routes registered with a raw regular expression, tried in registration order.
///
/// A pattern only has to match at the start of the path; anchor it with `$`
/// to require a full match.
pub struct Regexp<H>(Vec<(String, Regex, H)>);

impl<H> Regexp<H> {
    pub fn new() -> Self {
        Self(vec![])
    }

    pub fn add_route(&mut self, pattern: impl Into<String>, handler: H) -> Result<(), regex::Error> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{})", pattern))?;
        match self.0.iter_mut().find(|(p, _, _)| *p == pattern) {
            Some(entry) => entry.2 = handler,
            None => self.0.push((pattern, regex, handler)),
        }
        Ok(())
    }

    pub fn pattern_match(&self, path: &str) -> Option<Match<'_, H>> {
        for (pattern, regex, handler) in &self.0 {
            let caps = regex.captures(path);
            debug!(pattern = pattern.as_str(), path, matched = caps.is_some());
            if let Some(caps) = caps {
                let groups = caps
                    .iter()
                    .skip(1)
                    .map(|group| group.map(|g| percent_decode(g.as_str())).unwrap_or_default())
                    .collect();
                return Some(Match::new(pattern, handler).with_regex_groups(groups));
            }
        }
        None
    }
}
