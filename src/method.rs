use std::str::FromStr;

use strum_macros::{Display, EnumCount, EnumIter, EnumString};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumString, EnumIter, EnumCount)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Options = 0,
    Get = 1,
    Head = 2,
    Post = 3,
    Put = 4,
    Delete = 5,
    Trace = 6,
    Connect = 7,
}

#[derive(Error, Debug, Eq, PartialEq)]
#[error("invalid http method: {0:?}")]
pub struct InvalidMethod(pub String);

impl HttpMethod {
    /// Parses a request or route method, ignoring ASCII case.
    pub fn parse(value: &str) -> Result<Self, InvalidMethod> {
        HttpMethod::from_str(value).map_err(|_| InvalidMethod(value.to_owned()))
    }
}

/// Parses the method a route is registered under.
///
/// An empty string means the route answers any method.
pub fn route_method(method: &str) -> Result<Option<HttpMethod>, InvalidMethod> {
    if method.is_empty() {
        return Ok(None);
    }
    HttpMethod::parse(method).map(Some)
}
