//! Query parser for converting query strings to query trees.
//!
//! Supported syntax:
//! - Terms: `hello`, field-scoped terms: `title:hello`
//! - Phrases: `"hello world"`, with slop: `"hello world"~2`
//! - Prefixes and wildcards: `hel*`, `h?llo`, `*ending`
//! - Fuzzy terms: `roam~`, `roam~2`
//! - Ranges: `[a TO b]`, `{a TO b}`, `[a TO]`, mixed brackets `[a TO b}`
//! - Boosts: `hello^2`, `"a b"^0.5`, `(a b)^3`
//! - Operators, loosest first: `OR`, `AND`, implicit AND, `ANDNOT`, `NOT`
//! - Grouping: `(a OR b) c`, field-scoped groups: `title:(a b)`
//! - Escaping: a backslash removes the special meaning of the next character
//!
//! The grammar is permissive. Only an unterminated phrase or range bracket
//! is an error; anything else yields some tree.

use std::str::FromStr;

use tracing::debug;

use crate::error::{HalberdError, Result};
use crate::query::node::QueryNode;
use crate::query::phrase::PhraseQuery;
use crate::query::range::{Bound, RangeQuery};
use crate::schema::{FieldType, Schema};

/// Parses query strings into [`QueryNode`] trees.
///
/// With a schema, field prefixes naming unknown fields are kept as literal
/// text, numeric fields produce numeric ranges, and text fields lowercase
/// their query text.
#[derive(Debug, Clone)]
pub struct QueryParser {
    /// Field searched by atoms without a field prefix.
    default_field: String,
    /// Optional schema for field validation and normalization.
    schema: Option<Schema>,
}

impl QueryParser {
    /// Create a schema-less parser searching `default_field`.
    pub fn new<S: Into<String>>(default_field: S) -> Self {
        QueryParser {
            default_field: default_field.into(),
            schema: None,
        }
    }

    /// Attach a schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Get the default field.
    pub fn default_field(&self) -> &str {
        &self.default_field
    }

    /// Get the schema, if any.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Parse a query string into a query tree.
    pub fn parse(&self, query_str: &str) -> Result<QueryNode> {
        let tokens = Lexer::new(query_str, self.schema.as_ref()).tokenize()?;
        let mut parser = TokenParser {
            tokens,
            pos: 0,
            schema: self.schema.as_ref(),
        };
        let node = parser.parse_query(&self.default_field);
        debug!(query = query_str, parsed = %node, "parsed query");
        Ok(node)
    }
}

/// Builder for [`QueryParser`].
#[derive(Debug, Clone)]
pub struct QueryParserBuilder {
    default_field: String,
    schema: Option<Schema>,
}

impl QueryParserBuilder {
    /// Create a new builder with the default field `"text"`.
    pub fn new() -> Self {
        QueryParserBuilder {
            default_field: "text".to_string(),
            schema: None,
        }
    }

    /// Set the default field.
    pub fn default_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_field = field.into();
        self
    }

    /// Set the schema.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Build the query parser.
    pub fn build(self) -> QueryParser {
        QueryParser {
            default_field: self.default_field,
            schema: self.schema,
        }
    }
}

impl Default for QueryParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One character of query text, remembering whether it was escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Lexeme {
    ch: char,
    escaped: bool,
}

impl Lexeme {
    fn plain(ch: char) -> Self {
        Lexeme { ch, escaped: false }
    }

    fn is_unescaped(&self, ch: char) -> bool {
        !self.escaped && self.ch == ch
    }
}

fn resolve(lexemes: &[Lexeme]) -> String {
    lexemes.iter().map(|l| l.ch).collect()
}

/// Split on unescaped whitespace, dropping empty pieces.
fn split_words(lexemes: &[Lexeme]) -> Vec<&[Lexeme]> {
    lexemes
        .split(|l| !l.escaped && l.ch.is_whitespace())
        .filter(|piece| !piece.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    And,
    Or,
    AndNot,
    Not,
}

/// An unquoted word with its `^boost` and `~edits` suffixes split off.
#[derive(Debug, Clone, PartialEq)]
struct Word {
    lexemes: Vec<Lexeme>,
    boost: f32,
    fuzzy: Option<u32>,
}

impl Word {
    fn new(mut lexemes: Vec<Lexeme>) -> Self {
        let boost = split_suffix::<f32>(&mut lexemes, '^', false)
            .filter(|boost| *boost > 0.0)
            .unwrap_or(1.0);
        let fuzzy = split_suffix::<u32>(&mut lexemes, '~', true);
        Word {
            lexemes,
            boost,
            fuzzy,
        }
    }

    fn keyword(&self) -> Option<Keyword> {
        if self.boost != 1.0 || self.fuzzy.is_some() || self.lexemes.iter().any(|l| l.escaped) {
            return None;
        }
        match resolve(&self.lexemes).as_str() {
            "AND" => Some(Keyword::And),
            "OR" => Some(Keyword::Or),
            "ANDNOT" => Some(Keyword::AndNot),
            "NOT" => Some(Keyword::Not),
            _ => None,
        }
    }
}

/// Strip a trailing `<marker><number>` suffix from a word.
///
/// With `default_one`, a bare trailing marker yields 1.
fn split_suffix<T: FromStr + From<u8>>(
    lexemes: &mut Vec<Lexeme>,
    marker: char,
    default_one: bool,
) -> Option<T> {
    let idx = lexemes.iter().rposition(|l| l.is_unescaped(marker))?;
    if idx == 0 {
        return None;
    }
    let tail = &lexemes[idx + 1..];
    if !tail
        .iter()
        .all(|l| !l.escaped && (l.ch.is_ascii_digit() || l.ch == '.'))
    {
        return None;
    }
    let value = if tail.is_empty() && default_one {
        T::from(1u8)
    } else {
        resolve(tail).parse().ok()?
    };
    lexemes.truncate(idx);
    Some(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(Word),
    Phrase {
        words: Vec<String>,
        slop: u32,
        boost: f32,
    },
    Range {
        start: Option<String>,
        end: Option<String>,
        start_inclusive: bool,
        end_inclusive: bool,
        boost: f32,
    },
    Field(String),
    Open,
    Close {
        boost: f32,
    },
}

impl Token {
    fn starts_operand(&self) -> bool {
        !matches!(self, Token::Close { .. })
    }
}

/// Splits query text into tokens, resolving escapes.
struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    schema: Option<&'a Schema>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, schema: Option<&'a Schema>) -> Self {
        Lexer {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
            schema,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).map(|(_, c)| *c)
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.chars
            .get(pos)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.input.len())
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => self.pos += 1,
                '(' => {
                    self.pos += 1;
                    tokens.push(Token::Open);
                }
                ')' => {
                    self.pos += 1;
                    let boost = self.boost_suffix();
                    tokens.push(Token::Close { boost });
                }
                '"' => tokens.push(self.phrase()?),
                '[' | '{' => tokens.push(self.range()?),
                _ => self.word(&mut tokens),
            }
        }
        Ok(tokens)
    }

    /// Read a backslash escape or a plain character.
    fn next_lexeme(&mut self) -> Option<Lexeme> {
        let c = self.peek()?;
        self.pos += 1;
        if c != '\\' {
            return Some(Lexeme::plain(c));
        }
        match self.peek() {
            Some(next) => {
                self.pos += 1;
                Some(Lexeme {
                    ch: next,
                    escaped: true,
                })
            }
            None => Some(Lexeme {
                ch: '\\',
                escaped: true,
            }),
        }
    }

    fn word(&mut self, tokens: &mut Vec<Token>) {
        // The operand of a field prefix cannot name another field.
        let scoped = matches!(tokens.last(), Some(Token::Field(_)));
        let mut lexemes = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            if c == ':' && !scoped && self.is_field_prefix(&lexemes) {
                self.pos += 1;
                tokens.push(Token::Field(resolve(&lexemes)));
                return;
            }
            if let Some(lexeme) = self.next_lexeme() {
                lexemes.push(lexeme);
            }
        }
        tokens.push(Token::Word(Word::new(lexemes)));
    }

    /// Whether the lexemes read so far, followed by the `:` at the current
    /// position, form a field prefix.
    fn is_field_prefix(&self, lexemes: &[Lexeme]) -> bool {
        let valid_name = !lexemes.is_empty()
            && lexemes
                .iter()
                .all(|l| !l.escaped && (l.ch.is_ascii_alphanumeric() || l.ch == '_'));
        let has_operand = self
            .peek_at(self.pos + 1)
            .is_some_and(|next| !next.is_whitespace() && next != ')');
        if !valid_name || !has_operand {
            return false;
        }
        match self.schema {
            Some(schema) => schema.has_field(&resolve(lexemes)),
            None => true,
        }
    }

    /// Read lexemes up to an unescaped closing character.
    ///
    /// Returns the content and the closing character, or `None` at end of input.
    fn delimited(&mut self, closers: &[char]) -> Option<(Vec<Lexeme>, char)> {
        let mut lexemes = Vec::new();
        while let Some(lexeme) = self.next_lexeme() {
            if !lexeme.escaped && closers.contains(&lexeme.ch) {
                return Some((lexemes, lexeme.ch));
            }
            lexemes.push(lexeme);
        }
        None
    }

    fn phrase(&mut self) -> Result<Token> {
        let start = self.byte_offset(self.pos);
        self.pos += 1;
        let Some((content, _)) = self.delimited(&['"']) else {
            return Err(HalberdError::parse(
                "Unterminated phrase",
                start..self.input.len(),
            ));
        };

        let words = split_words(&content).into_iter().map(resolve).collect();
        let mut slop = 0;
        let mut boost = 1.0;
        loop {
            if let Some(value) = self.number_suffix::<u32>('~') {
                slop = value;
            } else if let Some(value) = self.number_suffix::<f32>('^') {
                if value > 0.0 {
                    boost = value;
                }
            } else {
                break;
            }
        }
        Ok(Token::Phrase { words, slop, boost })
    }

    fn range(&mut self) -> Result<Token> {
        let start_offset = self.byte_offset(self.pos);
        let start_inclusive = self.peek() == Some('[');
        self.pos += 1;
        let Some((content, closer)) = self.delimited(&[']', '}']) else {
            return Err(HalberdError::parse(
                "Unterminated range",
                start_offset..self.input.len(),
            ));
        };

        let pieces = split_words(&content);
        let join = |pieces: &[&[Lexeme]]| -> Option<String> {
            let text = pieces
                .iter()
                .map(|piece| resolve(piece))
                .collect::<Vec<_>>()
                .join(" ");
            (!text.is_empty()).then_some(text)
        };
        let is_to = |piece: &&[Lexeme]| {
            piece.len() == 2 && piece[0].is_unescaped('T') && piece[1].is_unescaped('O')
        };

        let (start, end) = match pieces.iter().position(is_to) {
            Some(k) => (join(&pieces[..k]), join(&pieces[k + 1..])),
            None => {
                let point = join(&pieces[..]);
                (point.clone(), point)
            }
        };

        Ok(Token::Range {
            start,
            end,
            start_inclusive,
            end_inclusive: closer == ']',
            boost: self.boost_suffix(),
        })
    }

    fn boost_suffix(&mut self) -> f32 {
        self.number_suffix::<f32>('^')
            .filter(|boost| *boost > 0.0)
            .unwrap_or(1.0)
    }

    /// Consume `<marker><digits>` at the current position if it parses.
    fn number_suffix<T: FromStr>(&mut self, marker: char) -> Option<T> {
        if self.peek() != Some(marker) {
            return None;
        }
        let mut end = self.pos + 1;
        while self
            .peek_at(end)
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            end += 1;
        }
        let text: String = self.chars[self.pos + 1..end].iter().map(|(_, c)| *c).collect();
        let value = text.parse().ok()?;
        self.pos = end;
        Some(value)
    }
}

/// Recursive-descent parser over the token stream.
struct TokenParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    schema: Option<&'a Schema>,
}

impl TokenParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at_group_end(&self) -> bool {
        matches!(self.peek(), None | Some(Token::Close { .. }))
    }

    /// The keyword at the current position, if it acts as an operator.
    fn operator(&self) -> Option<Keyword> {
        let Some(Token::Word(word)) = self.peek() else {
            return None;
        };
        let keyword = word.keyword()?;
        self.tokens
            .get(self.pos + 1)
            .is_some_and(Token::starts_operand)
            .then_some(keyword)
    }

    fn parse_query(&mut self, field: &str) -> QueryNode {
        let mut parts = Vec::new();
        while self.peek().is_some() {
            let before = self.pos;
            parts.push(self.parse_or(field));
            // A stray closing parenthesis is skipped.
            if matches!(self.peek(), Some(Token::Close { .. })) || self.pos == before {
                self.pos += 1;
            }
        }
        combine(parts, false)
    }

    fn parse_or(&mut self, field: &str) -> QueryNode {
        let mut branches = vec![self.parse_and(field)];
        while self.operator() == Some(Keyword::Or) {
            self.pos += 1;
            branches.push(self.parse_and(field));
        }
        combine(branches, true)
    }

    fn parse_and(&mut self, field: &str) -> QueryNode {
        let mut children = self.parse_implicit(field);
        while self.operator() == Some(Keyword::And) {
            self.pos += 1;
            children.extend(self.parse_implicit(field));
        }
        combine(children, false)
    }

    fn parse_implicit(&mut self, field: &str) -> Vec<QueryNode> {
        let mut items = Vec::new();
        while !self.at_group_end() && !matches!(self.operator(), Some(Keyword::And | Keyword::Or))
        {
            items.push(self.parse_and_not(field));
        }
        items
    }

    fn parse_and_not(&mut self, field: &str) -> QueryNode {
        let mut left = self.parse_not(field);
        while self.operator() == Some(Keyword::AndNot) {
            self.pos += 1;
            let right = self.parse_not(field);
            left = match (left, right) {
                (QueryNode::Null, _) => QueryNode::Null,
                (left, QueryNode::Null) => left,
                (left, right) => QueryNode::and_not(left, right),
            };
        }
        left
    }

    fn parse_not(&mut self, field: &str) -> QueryNode {
        if self.operator() == Some(Keyword::Not) {
            self.pos += 1;
            return match self.parse_not(field) {
                QueryNode::Null => QueryNode::Null,
                child => QueryNode::not(child),
            };
        }
        self.parse_atom(field)
    }

    fn parse_atom(&mut self, field: &str) -> QueryNode {
        let Some(token) = self.peek().cloned() else {
            return QueryNode::Null;
        };
        match token {
            Token::Close { .. } => QueryNode::Null,
            Token::Field(name) => {
                self.pos += 1;
                self.parse_atom(&name)
            }
            Token::Open => {
                self.pos += 1;
                let inner = self.parse_or(field);
                match self.peek() {
                    Some(Token::Close { boost }) => {
                        let boost = *boost;
                        self.pos += 1;
                        multiply_boost(inner, boost)
                    }
                    _ => inner,
                }
            }
            Token::Word(word) => {
                self.pos += 1;
                self.word_node(field, &word)
            }
            Token::Phrase { words, slop, boost } => {
                self.pos += 1;
                self.phrase_node(field, words, slop, boost)
            }
            Token::Range {
                start,
                end,
                start_inclusive,
                end_inclusive,
                boost,
            } => {
                self.pos += 1;
                self.range_node(field, start, end, start_inclusive, end_inclusive)
                    .with_boost(boost)
            }
        }
    }

    fn field_type(&self, field: &str) -> Option<FieldType> {
        self.schema.and_then(|schema| schema.field_type(field))
    }

    fn normalize(&self, field: &str, text: &str) -> String {
        match self.field_type(field) {
            Some(field_type) => field_type.normalize(text),
            None => text.to_string(),
        }
    }

    fn word_node(&self, field: &str, word: &Word) -> QueryNode {
        let text = resolve(&word.lexemes);

        if self.field_type(field).is_some_and(|t| t.is_numeric()) {
            if let Ok(value) = text.parse::<f64>() {
                return QueryNode::numeric_range(field, Some(value), Some(value))
                    .with_boost(word.boost);
            }
        }

        let node = if let Some(max_edits) = word.fuzzy {
            QueryNode::fuzzy(field, self.normalize(field, &text), max_edits)
        } else {
            match classify(&word.lexemes) {
                Pattern::Literal => QueryNode::term(field, self.normalize(field, &text)),
                Pattern::Prefix => {
                    let prefix = resolve(&word.lexemes[..word.lexemes.len() - 1]);
                    QueryNode::prefix(field, self.normalize(field, &prefix))
                }
                Pattern::Wildcard => QueryNode::wildcard(field, self.normalize(field, &text)),
            }
        };
        node.with_boost(word.boost)
    }

    fn phrase_node(&self, field: &str, words: Vec<String>, slop: u32, boost: f32) -> QueryNode {
        let mut words: Vec<String> = words
            .iter()
            .map(|word| self.normalize(field, word))
            .collect();
        match words.len() {
            0 => QueryNode::Null,
            1 => QueryNode::term(field, words.remove(0)).with_boost(boost),
            _ => QueryNode::Phrase(
                PhraseQuery::new(field, words)
                    .with_slop(slop)
                    .with_boost(boost),
            ),
        }
    }

    fn range_node(
        &self,
        field: &str,
        start: Option<String>,
        end: Option<String>,
        start_inclusive: bool,
        end_inclusive: bool,
    ) -> QueryNode {
        if self.field_type(field).is_some_and(|t| t.is_numeric()) {
            let parse = |bound: &Option<String>| match bound {
                Some(text) => text.parse::<f64>().map(Some).ok(),
                None => Some(None),
            };
            if let (Some(low), Some(high)) = (parse(&start), parse(&end)) {
                return QueryNode::NumericRange(RangeQuery::new(
                    field,
                    Bound::from_option(low, start_inclusive),
                    Bound::from_option(high, end_inclusive),
                ));
            }
        }

        let start = start.map(|text| self.normalize(field, &text));
        let end = end.map(|text| self.normalize(field, &text));
        QueryNode::TermRange(RangeQuery::new(
            field,
            Bound::from_option(start, start_inclusive),
            Bound::from_option(end, end_inclusive),
        ))
    }
}

/// How an unquoted word is matched against the lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Literal,
    Prefix,
    Wildcard,
}

/// Classify a word by its unescaped wildcard characters.
///
/// A single trailing `*` with no other wildcard makes a prefix, unless the
/// word also holds an escaped wildcard or backslash: flattening the escapes
/// would then lose which characters were literal.
fn classify(lexemes: &[Lexeme]) -> Pattern {
    let stars: Vec<usize> = lexemes
        .iter()
        .enumerate()
        .filter(|(_, l)| l.is_unescaped('*'))
        .map(|(i, _)| i)
        .collect();
    let has_question = lexemes.iter().any(|l| l.is_unescaped('?'));
    if stars.is_empty() && !has_question {
        return Pattern::Literal;
    }

    let escaped_special = lexemes
        .iter()
        .any(|l| l.escaped && matches!(l.ch, '*' | '?' | '\\'));
    if !has_question && stars == [lexemes.len() - 1] && !escaped_special {
        Pattern::Prefix
    } else {
        Pattern::Wildcard
    }
}

fn multiply_boost(node: QueryNode, boost: f32) -> QueryNode {
    if boost == 1.0 {
        return node;
    }
    let combined = node.boost() * boost;
    node.with_boost(combined)
}

/// Join parsed operands, dropping `Null`s and collapsing singletons.
fn combine(mut children: Vec<QueryNode>, disjunction: bool) -> QueryNode {
    children.retain(|child| !child.is_null());
    match children.len() {
        0 => QueryNode::Null,
        1 => children.remove(0),
        _ if disjunction => QueryNode::or(children),
        _ => QueryNode::and(children),
    }
}
