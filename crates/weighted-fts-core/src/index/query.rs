//! Parsed query expression for a raw search term.

use super::expr::{quote_literal, SqlNode, SqlWriter};

/// `plainto_tsquery('<dictionary>', <term>)` with the term always bound.
///
/// The node holds no term text. The term only ever reaches SQL as the
/// writer's bound placeholder, so it cannot be spliced into the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExpr {
    dictionary: String,
    prefix: String,
}

impl QueryExpr {
    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }
}

impl SqlNode for QueryExpr {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.push_str(&self.prefix);
        w.push_term();
        w.push_str(")");
    }
}

/// Build the parsed-query template for `dictionary`.
pub fn build_query(dictionary: &str) -> QueryExpr {
    QueryExpr {
        dictionary: dictionary.to_string(),
        prefix: format!("plainto_tsquery({}, ", quote_literal(dictionary)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaceholderStyle;
    use crate::index::expr::{BindValue, Bindings};

    #[test]
    fn test_query_positional() {
        let mut bindings = Bindings::new(PlaceholderStyle::Positional);
        let term = bindings.bind(BindValue::from("cats"));

        let clause = build_query("english").to_clause(&bindings, term);
        assert_eq!(clause.sql, "plainto_tsquery('english', ?)");
        assert_eq!(clause.refs, vec![term]);
    }

    #[test]
    fn test_query_numbered() {
        let mut bindings = Bindings::new(PlaceholderStyle::Numbered);
        let term = bindings.bind(BindValue::from("cats"));

        let clause = build_query("simple").to_clause(&bindings, term);
        assert_eq!(clause.sql, "plainto_tsquery('simple', $1)");
    }

    #[test]
    fn test_hostile_term_never_reaches_text() {
        let hostile = "x'); DROP TABLE articles; --";
        let mut bindings = Bindings::new(PlaceholderStyle::Positional);
        let term = bindings.bind(BindValue::from(hostile));

        let clause = build_query("english").to_clause(&bindings, term);
        assert!(!clause.sql.contains("DROP"));
        assert_eq!(bindings.values()[0].as_text(), Some(hostile));
    }
}
