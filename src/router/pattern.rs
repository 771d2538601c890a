use std::{borrow::Cow, collections::HashMap};

use lazy_static::lazy_static;
use regex::Regex;

/// Characters a path parameter may span. Excludes `/` so a parameter never
/// crosses a segment boundary.
const PARAM_CHARS: &str = r"[\w%.\-@!()\[\]|$]+";

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{(\w+)\}").unwrap();
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug)]
pub enum CompiledTemplate {
    Literal,
    Templated(Template),
}

#[derive(Debug)]
pub struct Template {
    segments: Vec<Segment>,
    // percent-encoded, in declaration order
    param_names: Vec<String>,
    regex: Regex,
}

impl Template {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Matches the whole path and zips the decoded captures with the decoded
    /// parameter names.
    pub fn path_values(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;
        let values = self
            .param_names
            .iter()
            .zip(caps.iter().skip(1))
            .map(|(name, value)| {
                let value = value.map(|v| percent_decode(v.as_str()));
                (percent_decode(name), value.unwrap_or_default())
            })
            .collect();
        Some(values)
    }
}

/// Compiles a path template.
///
/// Templates without a `{name}` placeholder are literal routes. Text that does
/// not form a placeholder, unbalanced braces included, is matched literally.
pub fn compile(template: &str) -> Result<CompiledTemplate, regex::Error> {
    if !PLACEHOLDER.is_match(template) {
        return Ok(CompiledTemplate::Literal);
    }

    let mut segments = vec![];
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Literal(template[last..whole.start()].to_owned()));
        }
        segments.push(Segment::Param(name.as_str().to_owned()));
        last = whole.end();
    }
    if last < template.len() {
        segments.push(Segment::Literal(template[last..].to_owned()));
    }

    let mut pattern = String::from("^");
    let mut param_names = vec![];
    for segment in &segments {
        match segment {
            Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
            Segment::Param(name) => {
                pattern.push('(');
                pattern.push_str(PARAM_CHARS);
                pattern.push(')');
                param_names.push(urlencoding::encode(name).into_owned());
            }
        }
    }
    pattern.push('$');

    Ok(CompiledTemplate::Templated(Template {
        segments,
        param_names,
        regex: Regex::new(&pattern)?,
    }))
}

/// Percent-decodes `s`, keeping it as is when the decoded bytes are not UTF-8.
pub fn percent_decode(s: &str) -> String {
    match urlencoding::decode(s) {
        Ok(Cow::Borrowed(decoded)) => decoded.to_owned(),
        Ok(Cow::Owned(decoded)) => decoded,
        Err(_) => s.to_owned(),
    }
}
