use std::collections::HashMap;

use super::Match;

pub struct Literal<H>(HashMap<String, H>);

impl<H> Literal<H> {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Registering the same path twice keeps the last handler.
    pub fn add_route(&mut self, path: impl Into<String>, handler: H) {
        self.0.insert(path.into(), handler);
    }

    pub fn pattern_match(&self, path: &str) -> Option<Match<'_, H>> {
        self.0
            .get_key_value(path)
            .map(|(pattern, handler)| Match::new(pattern, handler))
    }
}

#[cfg(test)]
mod tests {
    use super::Literal;

    #[test]
    fn test_literal() {
        let mut literal = Literal::new();
        literal.add_route("", "root");
        literal.add_route("items", "items");

        let m = literal.pattern_match("").unwrap();
        assert_eq!(m.pattern, "");
        assert_eq!(*m.handler, "root");
        assert!(m.path_values.is_empty());
        assert!(m.regex_groups.is_empty());

        let m = literal.pattern_match("items").unwrap();
        assert_eq!(*m.handler, "items");
    }

    #[test]
    fn test_literal_last_registration_wins() {
        let mut literal = Literal::new();
        literal.add_route("items", "first");
        literal.add_route("items", "second");

        assert_eq!(*literal.pattern_match("items").unwrap().handler, "second");
    }

    #[test]
    fn test_literal_no_match() {
        let mut literal = Literal::new();
        literal.add_route("items", "items");

        assert!(literal.pattern_match("items/").is_none());
        assert!(literal.pattern_match("Items").is_none());
        assert!(literal.pattern_match("item").is_none());
    }
}
