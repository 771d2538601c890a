use crate::router::pattern::{self, CompiledTemplate};

use super::{Literal, Match, PathParam, Regexp};

/// All routes registered under one method bucket.
pub struct Chain<H> {
    literal: Literal<H>,
    path_param: PathParam<H>,
    regexp: Regexp<H>,
}

impl<H> Chain<H> {
    pub fn new() -> Self {
        Self {
            literal: Literal::new(),
            path_param: PathParam::new(),
            regexp: Regexp::new(),
        }
    }

    /// `template` is expected without its leading slash.
    pub fn add_route(&mut self, template: &str, handler: H) -> Result<(), regex::Error> {
        match pattern::compile(template)? {
            CompiledTemplate::Literal => self.literal.add_route(template, handler),
            CompiledTemplate::Templated(t) => self.path_param.add_route(t, handler),
        }
        Ok(())
    }

    pub fn add_regexp_route(&mut self, regex: &str, handler: H) -> Result<(), regex::Error> {
        self.regexp.add_route(regex, handler)
    }

    pub fn literal_match(&self, path: &str) -> Option<Match<'_, H>> {
        self.literal.pattern_match(path)
    }

    pub fn path_param_match(&self, path: &str) -> Option<Match<'_, H>> {
        self.path_param.pattern_match(path)
    }

    pub fn regexp_match(&self, path: &str) -> Option<Match<'_, H>> {
        self.regexp.pattern_match(path)
    }
}
