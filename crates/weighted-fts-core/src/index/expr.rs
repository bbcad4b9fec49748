//! Typed SQL expression serialization with bind parameters.
//!
//! Expression nodes write themselves into a [`SqlWriter`]. Values never enter
//! the SQL text: each one is bound once into [`Bindings`] and referenced by a
//! placeholder. With [`PlaceholderStyle::Numbered`] a value bound once is
//! written as the same `$n` everywhere; with [`PlaceholderStyle::Positional`]
//! every `?` gets its own slot, filled from the single logical value.

use crate::config::PlaceholderStyle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BindValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Text(Arc<str>),
}

impl BindValue {
    pub fn text(value: impl Into<Arc<str>>) -> Self {
        BindValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BindValue::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        BindValue::Text(Arc::from(value))
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        BindValue::Text(Arc::from(value))
    }
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        BindValue::Integer(value)
    }
}

impl From<bool> for BindValue {
    fn from(value: bool) -> Self {
        BindValue::Boolean(value)
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Null => f.write_str("NULL"),
            BindValue::Boolean(b) => write!(f, "{}", b),
            BindValue::Integer(i) => write!(f, "{}", i),
            BindValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Logical bind values for one statement, each bound exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bindings {
    style: PlaceholderStyle,
    values: Vec<BindValue>,
}

impl Bindings {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            values: Vec::new(),
        }
    }

    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Bind a value and return its logical index.
    pub fn bind(&mut self, value: BindValue) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    pub fn values(&self) -> &[BindValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&BindValue> {
        self.values.get(index)
    }

    /// Parameters for the given clauses, in the order their text is concatenated.
    ///
    /// Numbered placeholders index the logical values directly, so the clause
    /// order is irrelevant and every value appears once. Positional placeholders
    /// need one entry per `?`, each a clone of the shared logical value.
    ///
    /// Every ref in `clauses` must index a bound value. Clauses produced by a
    /// writer over these bindings always do.
    pub fn parameters_for(&self, clauses: &[&SqlClause]) -> Vec<BindValue> {
        match self.style {
            PlaceholderStyle::Numbered => self.values.clone(),
            PlaceholderStyle::Positional => clauses
                .iter()
                .flat_map(|clause| clause.refs.iter())
                .map(|&index| self.values[index].clone())
                .collect(),
        }
    }

    fn placeholder(&self, index: usize) -> String {
        match self.style {
            PlaceholderStyle::Positional => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${}", index + 1),
        }
    }
}

/// Rendered SQL text plus the logical values its placeholders reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlClause {
    pub sql: String,
    /// Logical value index for each placeholder, in textual order.
    pub refs: Vec<usize>,
}

impl SqlClause {
    pub fn placeholder_count(&self) -> usize {
        self.refs.len()
    }
}

impl fmt::Display for SqlClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// An expression that can be written as SQL text.
pub trait SqlNode {
    fn write_sql(&self, w: &mut SqlWriter<'_>);

    /// Render into a standalone clause against `bindings`.
    fn to_clause(&self, bindings: &Bindings, term: usize) -> SqlClause {
        let mut w = SqlWriter::new(bindings, term);
        self.write_sql(&mut w);
        w.finish()
    }
}

/// Accumulates SQL text and placeholder references for one clause.
pub struct SqlWriter<'b> {
    bindings: &'b Bindings,
    term: usize,
    clause: SqlClause,
}

impl<'b> SqlWriter<'b> {
    /// `term` is the logical index of the search term in `bindings`.
    pub fn new(bindings: &'b Bindings, term: usize) -> Self {
        Self {
            bindings,
            term,
            clause: SqlClause::default(),
        }
    }

    pub fn push_str(&mut self, sql: &str) {
        self.clause.sql.push_str(sql);
    }

    /// Write a single-quoted literal. Only used for validated identifiers and
    /// weight letters, never for caller data.
    pub fn push_quoted(&mut self, literal: &str) {
        self.clause.sql.push_str(&quote_literal(literal));
    }

    /// Write a placeholder for an already bound value.
    pub fn push_param(&mut self, index: usize) {
        let placeholder = self.bindings.placeholder(index);
        self.clause.sql.push_str(&placeholder);
        self.clause.refs.push(index);
    }

    /// Write the placeholder of the search term.
    pub fn push_term(&mut self) {
        self.push_param(self.term);
    }

    /// Write caller SQL, mapping each bind marker to the next index in
    /// `indices`. Returns the number of markers seen.
    ///
    /// See [`split_template`] for what counts as a marker.
    pub fn push_template(&mut self, sql: &str, indices: &[usize]) -> usize {
        let mut markers = 0;
        for piece in split_template(sql) {
            match piece {
                TemplatePiece::Text(text) => self.clause.sql.push_str(text),
                TemplatePiece::LiteralQuestionMark => match self.bindings.style {
                    // The driver still sees `?` as a placeholder; keep its escape.
                    PlaceholderStyle::Positional => self.clause.sql.push_str("??"),
                    PlaceholderStyle::Numbered => self.clause.sql.push('?'),
                },
                TemplatePiece::Marker => {
                    if let Some(&index) = indices.get(markers) {
                        self.push_param(index);
                    }
                    markers += 1;
                }
            }
        }
        markers
    }

    pub fn finish(self) -> SqlClause {
        self.clause
    }
}

/// Single-quote a literal, doubling embedded quotes.
pub(crate) fn quote_literal(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}

/// A piece of caller SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplatePiece<'a> {
    Text(&'a str),
    /// `??`: a `?` operator, not a bind marker.
    LiteralQuestionMark,
    /// `?`: a bind marker.
    Marker,
}

/// Length of a dollar-quote tag (`$$`, `$body$`) at the start of `sql`.
fn dollar_tag_len(sql: &str) -> Option<usize> {
    let rest = sql.strip_prefix('$')?;
    let tag_len = rest
        .char_indices()
        .take_while(|&(i, ch)| {
            if i == 0 {
                ch.is_alphabetic() || ch == '_'
            } else {
                ch.is_alphanumeric() || ch == '_'
            }
        })
        .map(|(i, ch)| i + ch.len_utf8())
        .last()
        .unwrap_or(0);
    rest[tag_len..].starts_with('$').then_some(tag_len + 2)
}

/// Split caller SQL into text and bind markers.
///
/// `?` is a marker unless it sits inside a `'...'` literal, a `"..."`
/// identifier or a dollar-quoted body. `??` stands for a literal `?`, so
/// jsonb operators are written `??`, `??|` and `??&`.
pub(crate) fn split_template(sql: &str) -> Vec<TemplatePiece<'_>> {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while let Some(ch) = sql[i..].chars().next() {
        match ch {
            '\'' | '"' => {
                // Doubled quotes inside close and reopen, which is equivalent.
                i = match sql[i + 1..].find(ch) {
                    Some(close) => i + 1 + close + 1,
                    None => sql.len(),
                };
            }
            '$' => match dollar_tag_len(&sql[i..]) {
                Some(tag_len) => {
                    let tag = &sql[i..i + tag_len];
                    i = match sql[i + tag_len..].find(tag) {
                        Some(close) => i + tag_len + close + tag_len,
                        None => sql.len(),
                    };
                }
                None => i += 1,
            },
            '?' => {
                if text_start < i {
                    pieces.push(TemplatePiece::Text(&sql[text_start..i]));
                }
                if sql[i + 1..].starts_with('?') {
                    pieces.push(TemplatePiece::LiteralQuestionMark);
                    i += 2;
                } else {
                    pieces.push(TemplatePiece::Marker);
                    i += 1;
                }
                text_start = i;
            }
            _ => i += ch.len_utf8(),
        }
    }

    if text_start < sql.len() {
        pieces.push(TemplatePiece::Text(&sql[text_start..]));
    }
    pieces
}

/// Count bind markers in caller SQL.
pub(crate) fn count_markers(sql: &str) -> usize {
    split_template(sql)
        .iter()
        .filter(|piece| matches!(piece, TemplatePiece::Marker))
        .count()
}
