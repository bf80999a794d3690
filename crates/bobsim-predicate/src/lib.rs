//! # bobsim-predicate
//!
//! Compiles and evaluates the small boolean-expression language used to gate
//! outgoing links (§4.4). A predicate is parsed once at scenario load time
//! into a `CompiledPredicate` and evaluated against a message's payload plus
//! the implicit `SimTime` symbol on every candidate link, every hop.
//!
//! Grammar (informally):
//!   expr    := or_expr
//!   or_expr := and_expr ( "or" and_expr )*
//!   and_expr:= unary ( "and" unary )*
//!   unary   := "not" unary | atom
//!   atom    := "(" expr ")" | cmp
//!   cmp     := ident cmp_op literal
//!   cmp_op  := "==" | "!=" | "<=" | ">=" | "<" | ">" | "~="
//!
//! `~=` is the regex-match operator; its right-hand literal is compiled as a
//! pattern rather than compared for equality. A predicate source that is
//! empty, `~`, or `null` (case-insensitive) compiles to the always-true
//! sentinel per §4.4, the same as an absent `when` clause. A bare identifier other than
//! `SimTime` that does not appear in the message payload makes any
//! comparison against it evaluate to `false` rather than raising an error
//! (§4.4's "unknown-field comparisons are silently false" rule) -- this
//! keeps behavior predictable when upstream nodes disagree on payload shape.

use bobsim_types::message::Message;
use bobsim_types::time::{sim_to_secs_f64, SimTime};
use bobsim_types::value::Value;
use regex::Regex;

pub use bobsim_types::errors::PredicateError;

/// The lexer walks an ordered list of `(pattern, builder)` pairs and emits
/// the token built by the first pattern that matches the remaining input.
/// Order matters: multi-character operators must precede their single-char
/// prefixes (`==` before nothing clashes, but `<=`/`>=` must precede `<`/`>`).
struct LexRule {
    pattern: Regex,
    build: fn(&str) -> Token,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    Bool(bool),
    Op(CmpOp),
    Exists,
    NotExists,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Matches,
}

fn lex_rules() -> Vec<LexRule> {
    vec![
        LexRule { pattern: Regex::new(r"^\s+").unwrap(), build: |_| Token::LParen /* discarded, see below */ },
        LexRule { pattern: Regex::new(r"^==").unwrap(), build: |_| Token::Op(CmpOp::Eq) },
        LexRule { pattern: Regex::new(r"^!=").unwrap(), build: |_| Token::Op(CmpOp::Ne) },
        LexRule { pattern: Regex::new(r"^<=").unwrap(), build: |_| Token::Op(CmpOp::Le) },
        LexRule { pattern: Regex::new(r"^>=").unwrap(), build: |_| Token::Op(CmpOp::Ge) },
        LexRule { pattern: Regex::new(r"^~=").unwrap(), build: |_| Token::Op(CmpOp::Matches) },
        LexRule { pattern: Regex::new(r"^<").unwrap(), build: |_| Token::Op(CmpOp::Lt) },
        LexRule { pattern: Regex::new(r"^>").unwrap(), build: |_| Token::Op(CmpOp::Gt) },
        LexRule { pattern: Regex::new(r"^\(").unwrap(), build: |_| Token::LParen },
        LexRule { pattern: Regex::new(r"^\)").unwrap(), build: |_| Token::RParen },
        LexRule {
            pattern: Regex::new(r#"^"([^"\\]|\\.)*""#).unwrap(),
            build: |s| Token::Str(s[1..s.len() - 1].replace("\\\"", "\"")),
        },
        LexRule {
            pattern: Regex::new(r"^-?[0-9]+(\.[0-9]+)?").unwrap(),
            build: |s| Token::Number(s.parse().unwrap_or(0.0)),
        },
        LexRule {
            pattern: Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*").unwrap(),
            build: |s| match s {
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                "EXISTS" => Token::Exists,
                "NOT_EXISTS" => Token::NotExists,
                "True" => Token::Bool(true),
                "False" => Token::Bool(false),
                _ => Token::Ident(s.to_string()),
            },
        },
    ]
}

fn tokenize(src: &str) -> Result<Vec<Token>, PredicateError> {
    let rules = lex_rules();
    let mut rest = src;
    let mut out = Vec::new();
    'outer: while !rest.is_empty() {
        for (i, rule) in rules.iter().enumerate() {
            if let Some(m) = rule.pattern.find(rest) {
                let text = &rest[m.start()..m.end()];
                // rule 0 is whitespace, discard instead of tokenizing
                if i != 0 {
                    out.push((rule.build)(text));
                }
                rest = &rest[m.end()..];
                continue 'outer;
            }
        }
        return Err(PredicateError::InvalidOperator(rest.chars().next().unwrap_or(' ').to_string()));
    }
    Ok(out)
}

#[derive(Debug, Clone)]
enum Expr {
    Cmp { field: String, op: CmpOp, literal: Literal },
    Exists { field: String },
    NotExists { field: String },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

#[derive(Debug, Clone)]
enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
    Regex(Regex),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn parse_expr(&mut self) -> Result<Expr, PredicateError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, PredicateError> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.next();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, PredicateError> {
        let mut lhs = self.parse_unary()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.next();
            let rhs = self.parse_unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, PredicateError> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.next();
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, PredicateError> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(PredicateError::UnbalancedParens(String::new())),
                }
            }
            Some(Token::Ident(field)) => {
                match self.peek() {
                    Some(Token::Exists) => {
                        self.next();
                        return Ok(Expr::Exists { field });
                    }
                    Some(Token::NotExists) => {
                        self.next();
                        return Ok(Expr::NotExists { field });
                    }
                    _ => {}
                }
                let op = match self.next() {
                    Some(Token::Op(op)) => op,
                    other => {
                        return Err(PredicateError::InvalidOperator(format!("{other:?}")))
                    }
                };
                let literal = match self.next() {
                    Some(Token::Number(n)) => Literal::Number(n),
                    Some(Token::Bool(b)) => Literal::Bool(b),
                    Some(Token::Str(s)) if op == CmpOp::Matches => Regex::new(&s)
                        .map(Literal::Regex)
                        .map_err(|e| PredicateError::InvalidRegex(e.to_string()))?,
                    Some(Token::Str(s)) => Literal::Str(s),
                    other => {
                        return Err(PredicateError::InvalidOperator(format!("{other:?}")))
                    }
                };
                Ok(Expr::Cmp { field, op, literal })
            }
            other => Err(PredicateError::DanglingOperator(format!("{other:?}"))),
        }
    }
}

/// A compiled, ready-to-evaluate predicate. Cheap to clone; holds compiled
/// regexes so `~=` matches don't recompile per hop.
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    expr: Option<Expr>,
    source: String,
}

impl CompiledPredicate {
    /// A predicate with no expression always matches; this is the default
    /// for links with no `when` clause.
    pub fn always() -> Self {
        CompiledPredicate { expr: None, source: String::new() }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates this predicate against a message's payload and the current
    /// simulated time, converted to seconds for the `SimTime` symbol.
    pub fn eval(&self, message: &Message, now: SimTime) -> bool {
        match &self.expr {
            None => true,
            Some(expr) => eval_expr(expr, message, now),
        }
    }
}

fn eval_expr(expr: &Expr, message: &Message, now: SimTime) -> bool {
    match expr {
        Expr::And(a, b) => eval_expr(a, message, now) && eval_expr(b, message, now),
        Expr::Or(a, b) => eval_expr(a, message, now) || eval_expr(b, message, now),
        Expr::Not(inner) => !eval_expr(inner, message, now),
        Expr::Cmp { field, op, literal } => eval_cmp(field, *op, literal, message, now),
        Expr::Exists { field } => field == "SimTime" || message.get(field).is_some(),
        Expr::NotExists { field } => field != "SimTime" && message.get(field).is_none(),
    }
}

fn eval_cmp(field: &str, op: CmpOp, literal: &Literal, message: &Message, now: SimTime) -> bool {
    let value = if field == "SimTime" {
        Some(Value::Float(sim_to_secs_f64(now)))
    } else {
        message.get(field).cloned()
    };

    let Some(value) = value else {
        // unknown field: silently false, never an error.
        return false;
    };

    match (op, literal) {
        (CmpOp::Matches, Literal::Regex(re)) => value.as_str().is_some_and(|s| re.is_match(s)),
        (CmpOp::Matches, _) => false,
        (_, Literal::Str(s)) => {
            let Some(lhs) = value.as_str() else { return false };
            match op {
                CmpOp::Eq => lhs == s,
                CmpOp::Ne => lhs != s,
                _ => false,
            }
        }
        (_, Literal::Number(n)) => {
            let Some(lhs) = value.as_f64() else { return false };
            match op {
                CmpOp::Eq => lhs == *n,
                CmpOp::Ne => lhs != *n,
                CmpOp::Lt => lhs < *n,
                CmpOp::Le => lhs <= *n,
                CmpOp::Gt => lhs > *n,
                CmpOp::Ge => lhs >= *n,
                CmpOp::Matches => false,
            }
        }
        (_, Literal::Bool(b)) => {
            let Some(lhs) = value.as_bool() else { return false };
            match op {
                CmpOp::Eq => lhs == *b,
                CmpOp::Ne => lhs != *b,
                _ => false,
            }
        }
        (_, Literal::Regex(_)) => false,
    }
}

/// Parses predicate source into a `CompiledPredicate`. An empty or
/// whitespace-only source compiles to `CompiledPredicate::always()`.
pub fn compile(source: &str) -> Result<CompiledPredicate, PredicateError> {
    let trimmed = source.trim();
    if trimmed.is_empty() || trimmed == "~" || trimmed.eq_ignore_ascii_case("null") {
        return Ok(CompiledPredicate::always());
    }
    let tokens = tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err(PredicateError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(PredicateError::DanglingOperator(trimmed.to_string()));
    }
    Ok(CompiledPredicate { expr: Some(expr), source: trimmed.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobsim_types::message::Message;
    use bobsim_types::value::Value;

    fn msg_with(field: &str, value: Value) -> Message {
        Message::new(1, 0, 0).with_field(field, value)
    }

    #[test]
    fn equality_on_string_field() {
        let pred = compile(r#"kind == "ack""#).unwrap();
        let msg = msg_with("kind", Value::Str("ack".into()));
        assert!(pred.eval(&msg, 0));
        let other = msg_with("kind", Value::Str("data".into()));
        assert!(!pred.eval(&other, 0));
    }

    #[test]
    fn unknown_field_is_false_not_error() {
        let pred = compile("missing > 1").unwrap();
        let msg = Message::new(1, 0, 0);
        assert!(!pred.eval(&msg, 0));
    }

    #[test]
    fn exists_and_not_exists() {
        let present = compile("tag EXISTS").unwrap();
        let absent = compile("tag NOT_EXISTS").unwrap();
        let msg = msg_with("tag", Value::Str("x".into()));
        let empty = Message::new(1, 0, 0);
        assert!(present.eval(&msg, 0));
        assert!(!present.eval(&empty, 0));
        assert!(!absent.eval(&msg, 0));
        assert!(absent.eval(&empty, 0));
    }

    #[test]
    fn bool_literal_equality() {
        let pred = compile("urgent == True").unwrap();
        let msg = msg_with("urgent", Value::Bool(true));
        assert!(pred.eval(&msg, 0));
        let other = msg_with("urgent", Value::Bool(false));
        assert!(!pred.eval(&other, 0));
    }

    #[test]
    fn simtime_symbol_uses_seconds() {
        let pred = compile("SimTime >= 10").unwrap();
        let msg = Message::new(1, 0, 0);
        assert!(!pred.eval(&msg, bobsim_types::time::sim_from_secs(5)));
        assert!(pred.eval(&msg, bobsim_types::time::sim_from_secs(10)));
    }

    #[test]
    fn and_or_not_precedence() {
        let pred = compile(r#"(size > 10 or size < 2) and not urgent == "false""#).unwrap();
        let msg = msg_with("size", Value::Int(20)).with_field("urgent", Value::Str("true".into()));
        assert!(pred.eval(&msg, 0));
    }

    #[test]
    fn regex_match_operator() {
        let pred = compile(r#"name ~= "^node-\d+$""#).unwrap();
        let msg = msg_with("name", Value::Str("node-42".into()));
        assert!(pred.eval(&msg, 0));
        let other = msg_with("name", Value::Str("nodeX".into()));
        assert!(!pred.eval(&other, 0));
    }

    #[test]
    fn empty_predicate_always_matches() {
        let pred = compile("").unwrap();
        assert!(pred.eval(&Message::new(1, 0, 0), 0));
    }

    #[test]
    fn tilde_and_null_sentinels_always_match() {
        assert!(compile("~").unwrap().eval(&Message::new(1, 0, 0), 0));
        assert!(compile("null").unwrap().eval(&Message::new(1, 0, 0), 0));
        assert!(compile("NULL").unwrap().eval(&Message::new(1, 0, 0), 0));
    }
}
