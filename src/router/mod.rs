use std::array;

use strum::EnumCount;
use thiserror::Error;
use tracing::debug;

use crate::{
    method::{HttpMethod, InvalidMethod},
    resource::{Resources, StaticFile},
};

pub use matcher::Match;
pub use pattern::percent_decode;

mod matcher;
pub mod pattern;

use matcher::Chain;

// one bucket per method plus the wildcard bucket
const BUCKETS: usize = HttpMethod::COUNT + 1;
const ANY: usize = HttpMethod::COUNT;

fn bucket(method: Option<HttpMethod>) -> usize {
    method.map_or(ANY, |m| m as usize)
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error(transparent)]
    InvalidMethod(#[from] InvalidMethod),
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Debug)]
pub enum Resolution<'r, H> {
    Found(Match<'r, H>),
    Static(StaticFile),
    NotFound,
}

impl<'r, H> Resolution<'r, H> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

/// Route tables for every method plus the static resource mappings.
///
/// Built once before serving and only read afterwards.
pub struct Router<H> {
    chains: [Chain<H>; BUCKETS],
    resources: Resources,
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self {
            chains: array::from_fn(|_| Chain::new()),
            resources: Resources::new(),
        }
    }

    /// Registers a literal or templated route. `None` answers any method.
    pub fn add_route(
        &mut self,
        method: Option<HttpMethod>,
        template: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        let template = template.strip_prefix('/').unwrap_or(template);
        debug!(?method, template, "map route");
        self.chains[bucket(method)]
            .add_route(template, handler)
            .map_err(|source| RouteError::InvalidRegex {
                pattern: template.to_owned(),
                source,
            })
    }

    /// Registers a route matched by a raw regular expression against the
    /// request path as received, leading slash included.
    pub fn add_regexp_route(
        &mut self,
        method: Option<HttpMethod>,
        regex: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        debug!(?method, regex, "map regexp route");
        self.chains[bucket(method)]
            .add_regexp_route(regex, handler)
            .map_err(|source| RouteError::InvalidRegex {
                pattern: regex.to_owned(),
                source,
            })
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    /// Finds the handler for a request.
    ///
    /// Stages run in order and the first hit wins: literal, path parameter,
    /// regexp, static resource. Each route stage checks the method's bucket
    /// before the wildcard bucket.
    ///
    /// Literal routes compare against the percent-decoded path. Templated and
    /// regexp routes see the path as received and decode what they capture.
    pub fn resolve(&self, method: HttpMethod, path: &str) -> Resolution<'_, H> {
        let own = &self.chains[method as usize];
        let any = &self.chains[ANY];
        let stripped = path.strip_prefix('/').unwrap_or(path);
        let decoded = percent_decode(stripped);

        let found = own
            .literal_match(&decoded)
            .or_else(|| any.literal_match(&decoded))
            .or_else(|| own.path_param_match(stripped))
            .or_else(|| any.path_param_match(stripped))
            .or_else(|| own.regexp_match(path))
            .or_else(|| any.regexp_match(path));
        if let Some(m) = found {
            return Resolution::Found(m);
        }

        match self.resources.resolve(path) {
            Some(file) => Resolution::Static(file),
            None => Resolution::NotFound,
        }
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}
