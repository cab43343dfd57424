// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Recursive-descent parser producing the filter AST

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::lexer::{tokenize, Spanned, Token};
use crate::error::{Error, Result};

/// Nesting limit for sub-expressions
const MAX_DEPTH: usize = 64;

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Expression tree
#[derive(Debug, Clone)]
pub enum Expr {
    /// Literal value
    Literal(Value),
    /// `undefined`
    Undefined,
    /// Regex literal
    Regex(Regex),
    /// Bare identifier
    Ident(String),
    /// `object.name` or `object[expr]`
    Member { object: Box<Expr>, property: Box<Expr> },
    /// `object.method(args)`
    Call {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// `!expr`
    Not(Box<Expr>),
    /// `-expr`
    Neg(Box<Expr>),
    /// `a && b`
    And(Box<Expr>, Box<Expr>),
    /// `a || b`
    Or(Box<Expr>, Box<Expr>),
    /// Comparison
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Parse an expression into its AST
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };

    if parser.tokens.is_empty() {
        return Err(Error::filter_parse(source, 0, "empty expression"));
    }

    let expr = parser.or()?;
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(Error::filter_parse(
            source,
            extra.pos,
            format!("unexpected token {:?}", extra.token),
        ));
    }
    Ok(expr)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, reason: impl Into<String>) -> Error {
        let pos = self
            .tokens
            .get(self.pos)
            .map(|s| s.pos)
            .unwrap_or(self.source.len());
        Error::filter_parse(self.source, pos, reason)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<()> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_here(format!("expected {}", what)))
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error_here("expression nested too deeply"));
        }
        Ok(())
    }

    fn or(&mut self) -> Result<Expr> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut left = self.equality()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut left = self.relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::StrictEq) => CompareOp::StrictEq,
                Some(Token::StrictNe) => CompareOp::StrictNe,
                Some(Token::LooseEq) => CompareOp::LooseEq,
                Some(Token::LooseNe) => CompareOp::LooseNe,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.relational()?;
            left = Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn relational(&mut self) -> Result<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => CompareOp::Lt,
                Some(Token::Le) => CompareOp::Le,
                Some(Token::Gt) => CompareOp::Gt,
                Some(Token::Ge) => CompareOp::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        let wrap: fn(Box<Expr>) -> Expr = match self.peek() {
            Some(Token::Not) => Expr::Not,
            Some(Token::Minus) => Expr::Neg,
            _ => return self.postfix(),
        };
        self.pos += 1;
        self.enter()?;
        let inner = self.unary()?;
        self.depth -= 1;
        Ok(wrap(Box::new(inner)))
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    let name = match self.advance() {
                        Some(Spanned {
                            token: Token::Ident(name),
                            ..
                        }) => name,
                        _ => return Err(self.error_here("expected property name after '.'")),
                    };
                    if self.peek() == Some(&Token::LParen) {
                        self.pos += 1;
                        let args = self.arguments()?;
                        expr = Expr::Call {
                            object: Box::new(expr),
                            method: name,
                            args,
                        };
                    } else {
                        expr = Expr::Member {
                            object: Box::new(expr),
                            property: Box::new(Expr::Literal(Value::String(name))),
                        };
                    }
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    self.enter()?;
                    let property = self.or()?;
                    self.depth -= 1;
                    self.expect(Token::RBracket, "']'")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        self.enter()?;
        loop {
            args.push(self.or()?);
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error_here("expected ',' or ')'")),
            }
        }
        self.depth -= 1;
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr> {
        let Some(Spanned { token, pos }) = self.advance() else {
            return Err(self.error_here("unexpected end of input"));
        };

        match token {
            Token::Num(n) => Ok(Expr::Literal(number(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Undefined,
                _ => Expr::Ident(name),
            }),
            Token::Regex { pattern, flags } => self.regex(&pattern, &flags, pos),
            Token::LParen => {
                self.enter()?;
                let inner = self.or()?;
                self.depth -= 1;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            other => Err(Error::filter_parse(
                self.source,
                pos,
                format!("unexpected token {:?}", other),
            )),
        }
    }

    fn regex(&self, pattern: &str, flags: &str, pos: usize) -> Result<Expr> {
        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                // Stateful flags have no meaning for a single test
                'g' | 'y' | 'u' => &mut builder,
                other => {
                    return Err(Error::filter_parse(
                        self.source,
                        pos,
                        format!("unsupported regex flag '{}'", other),
                    ))
                }
            };
        }
        builder
            .build()
            .map(Expr::Regex)
            .map_err(|e| Error::filter_parse(self.source, pos, e.to_string()))
    }
}

/// Integral numbers stay integers so they compare equal to JSON integers
pub(super) fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let expr = parse("a || b && c").unwrap();
        match expr {
            Expr::Or(_, right) => assert!(matches!(*right, Expr::And(_, _))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_member_chain_and_call() {
        let expr = parse("network.url.startsWith('https')").unwrap();
        match expr {
            Expr::Call { method, args, .. } => {
                assert_eq!(method, "startsWith");
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse("network.url 'x'").unwrap_err();
        assert!(matches!(err, Error::FilterParse { position: 12, .. }));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(parse("(network.url === 'x'").is_err());
        assert!(parse("network.url)").is_err());
    }

    #[test]
    fn test_empty_expression() {
        assert!(parse("   ").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}true{}", "(".repeat(100), ")".repeat(100));
        assert!(parse(&deep).is_err());
        let shallow = format!("{}true{}", "(".repeat(10), ")".repeat(10));
        assert!(parse(&shallow).is_ok());
    }

    #[test]
    fn test_invalid_regex() {
        assert!(parse("/(unclosed/.test(network.url)").is_err());
        assert!(parse("/x/q.test(network.url)").is_err());
    }

    #[test]
    fn test_unary_minus() {
        match parse("network.responseCode > -1").unwrap() {
            Expr::Compare { right, .. } => assert!(matches!(*right, Expr::Neg(_))),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(parse("!-1").unwrap(), Expr::Not(inner) if matches!(*inner, Expr::Neg(_))));
        assert!(parse("network.responseCode -").is_err());
        assert!(parse(&format!("{}1", "-".repeat(100))).is_err());
    }
}
