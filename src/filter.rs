use regex::Regex;
use tracing::debug;

use crate::{request::Request, response_writer::ResponseWriter, router::RouteError};

/// What the server does after a filter ran.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Flow {
    Continue,
    /// Skip the remaining filters and the handler; the response written so
    /// far is sent as is.
    Halt,
}

pub trait Filter {
    fn filter(&self, w: &mut ResponseWriter, r: &mut Request) -> Flow;
}

impl<T> Filter for T
where
    T: Fn(&mut ResponseWriter, &mut Request) -> Flow,
{
    fn filter(&self, w: &mut ResponseWriter, r: &mut Request) -> Flow {
        self(w, r)
    }
}

/// Filters keyed by path pattern. Every matching filter applies, in the order
/// they were added.
pub struct FilterChain<F>(Vec<(Regex, F)>);

impl<F> FilterChain<F> {
    pub fn new() -> Self {
        Self(vec![])
    }

    /// `pattern` must match at the start of the path, not necessarily all of it.
    /// Adding the same pattern twice keeps both filters.
    pub fn add_filter(&mut self, pattern: &str, filter: F) -> Result<(), RouteError> {
        let regex =
            Regex::new(&format!("^(?:{})", pattern)).map_err(|source| RouteError::InvalidRegex {
                pattern: pattern.to_owned(),
                source,
            })?;
        debug!(pattern, "map filter");
        self.0.push((regex, filter));
        Ok(())
    }

    pub fn filters_for(&self, path: &str) -> Vec<&F> {
        self.0
            .iter()
            .filter(|(regex, _)| regex.is_match(path))
            .map(|(_, filter)| filter)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<F> Default for FilterChain<F> {
    fn default() -> Self {
        Self::new()
    }
}
