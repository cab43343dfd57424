// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Tokenizer for filter expressions

use crate::error::{Error, Result};

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    /// `/pattern/flags`
    Regex { pattern: String, flags: String },
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Not,
    Minus,
    And,
    Or,
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A token with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Tokenize an expression.
///
/// There is no division operator, so `/` always opens a regex literal.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>> {
    let mut lexer = Lexer {
        source,
        chars: source.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn error(&self, pos: usize, reason: impl Into<String>) -> Error {
        Error::filter_parse(self.source, pos, reason)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek().map(|(_, c)| *c) == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>> {
        while self.chars.peek().map_or(false, |(_, c)| c.is_whitespace()) {
            self.chars.next();
        }

        let Some((pos, c)) = self.chars.next() else {
            return Ok(None);
        };

        let token = match c {
            '.' if self.chars.peek().map_or(false, |(_, n)| n.is_ascii_digit()) => {
                self.number(pos)?
            }
            '.' => Token::Dot,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '-' => Token::Minus,
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        Token::StrictNe
                    } else {
                        Token::LooseNe
                    }
                } else {
                    Token::Not
                }
            }
            '=' => {
                if !self.eat('=') {
                    return Err(self.error(pos, "assignment is not allowed"));
                }
                if self.eat('=') {
                    Token::StrictEq
                } else {
                    Token::LooseEq
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '&' => {
                if !self.eat('&') {
                    return Err(self.error(pos, "expected '&&'"));
                }
                Token::And
            }
            '|' => {
                if !self.eat('|') {
                    return Err(self.error(pos, "expected '||'"));
                }
                Token::Or
            }
            '\'' | '"' => self.string(pos, c)?,
            '/' => self.regex(pos)?,
            c if c.is_ascii_digit() => self.number(pos)?,
            c if c.is_alphabetic() || c == '_' || c == '$' => self.ident(pos),
            other => return Err(self.error(pos, format!("unexpected character '{}'", other))),
        };

        Ok(Some(Spanned { token, pos }))
    }

    fn ident(&mut self, start: usize) -> Token {
        let mut end = start + 1;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Ident(self.source[start..end].to_string())
    }

    fn number(&mut self, start: usize) -> Result<Token> {
        let mut end = start + 1;
        let mut prev = None;
        while let Some(&(i, c)) = self.chars.peek() {
            let signed_exponent = matches!(c, '+' | '-') && matches!(prev, Some('e' | 'E'));
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || signed_exponent {
                end = i + 1;
                prev = Some(c);
                self.chars.next();
            } else {
                break;
            }
        }
        let text = &self.source[start..end];
        text.parse::<f64>()
            .map(Token::Num)
            .map_err(|_| self.error(start, format!("invalid number '{}'", text)))
    }

    fn string(&mut self, start: usize, quote: char) -> Result<Token> {
        let mut value = String::new();
        loop {
            let Some((_, c)) = self.chars.next() else {
                return Err(self.error(start, "unterminated string"));
            };
            match c {
                c if c == quote => return Ok(Token::Str(value)),
                '\\' => {
                    let Some((i, escaped)) = self.chars.next() else {
                        return Err(self.error(start, "unterminated string"));
                    };
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        '\\' | '\'' | '"' | '/' => escaped,
                        other => {
                            return Err(self.error(i, format!("unsupported escape '\\{}'", other)))
                        }
                    });
                }
                c => value.push(c),
            }
        }
    }

    fn regex(&mut self, start: usize) -> Result<Token> {
        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            let Some((_, c)) = self.chars.next() else {
                return Err(self.error(start, "unterminated regular expression"));
            };
            match c {
                '\\' => {
                    pattern.push(c);
                    if let Some((_, escaped)) = self.chars.next() {
                        pattern.push(escaped);
                    }
                }
                '[' => {
                    in_class = true;
                    pattern.push(c);
                }
                ']' => {
                    in_class = false;
                    pattern.push(c);
                }
                '/' if !in_class => break,
                c => pattern.push(c),
            }
        }

        let mut flags = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphabetic() {
                flags.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Ok(Token::Regex { pattern, flags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_member_and_strict_equality() {
        assert_eq!(
            kinds("network.requestHeaders['Content-type'] === 'application/json'"),
            vec![
                Token::Ident("network".into()),
                Token::Dot,
                Token::Ident("requestHeaders".into()),
                Token::LBracket,
                Token::Str("Content-type".into()),
                Token::RBracket,
                Token::StrictEq,
                Token::Str("application/json".into()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("! != !== == < <= > >= && ||"),
            vec![
                Token::Not,
                Token::LooseNe,
                Token::StrictNe,
                Token::LooseEq,
                Token::Lt,
                Token::Le,
                Token::Gt,
                Token::Ge,
                Token::And,
                Token::Or,
            ]
        );
    }

    #[test]
    fn test_numbers_and_escapes() {
        assert_eq!(
            kinds(r#"404 1.5 "a\"b""#),
            vec![Token::Num(404.0), Token::Num(1.5), Token::Str("a\"b".into())]
        );
    }

    #[test]
    fn test_regex_literal() {
        assert_eq!(
            kinds(r"/api\/v[12]/i.test(network.url)")[0],
            Token::Regex {
                pattern: r"api\/v[12]".into(),
                flags: "i".into(),
            }
        );
    }

    #[test]
    fn test_rejects_assignment() {
        let err = tokenize("network.url = 'x'").unwrap_err();
        assert!(matches!(err, Error::FilterParse { position: 12, .. }));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(tokenize("'abc").is_err());
    }

    #[test]
    fn test_exponents_and_minus() {
        assert_eq!(
            kinds("1e-3 2E+2 5e1 -1"),
            vec![
                Token::Num(0.001),
                Token::Num(200.0),
                Token::Num(50.0),
                Token::Minus,
                Token::Num(1.0),
            ]
        );
        assert_eq!(kinds("3-1"), vec![Token::Num(3.0), Token::Minus, Token::Num(1.0)]);
        assert!(tokenize("1e+").is_err());
    }
}
