use std::collections::HashMap;

pub use chain::Chain;
pub use literal::Literal;
pub use path_param::PathParam;
pub use regexp::Regexp;

mod chain;
mod literal;
mod path_param;
mod regexp;

#[derive(Debug)]
pub struct Match<'r, H> {
    pub pattern: &'r str,
    pub handler: &'r H,
    pub path_values: HashMap<String, String>,
    pub regex_groups: Vec<String>,
}

impl<'r, H> Match<'r, H> {
    fn new(pattern: &'r str, handler: &'r H) -> Self {
        Self {
            pattern,
            handler,
            path_values: HashMap::new(),
            regex_groups: vec![],
        }
    }

    fn with_path_values(mut self, path_values: HashMap<String, String>) -> Self {
        self.path_values = path_values;
        self
    }

    fn with_regex_groups(mut self, regex_groups: Vec<String>) -> Self {
        self.regex_groups = regex_groups;
        self
    }
}
