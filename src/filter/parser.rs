//! Filter string parser.
//!
//! Recursive descent over a token stream, with the RFC 7644 §3.4.2.2
//! precedence: grouping and brackets bind tightest, then `not`, `and`, `or`.
//! Operator and logical keywords are case-insensitive; string literals are
//! JSON-quoted; numbers, booleans, and `null` follow JSON syntax.

use super::Filter;
use crate::error::{ScimError, ScimResult};
use crate::path::Path;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    /// Attribute path or keyword; interpretation is positional
    Word(String),
    /// Decoded JSON string literal
    Str(String),
    Number(serde_json::Number),
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '$' | '_' | '-' | '.' | ':')
}

fn tokenize(input: &str) -> ScimResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            ' ' | '\t' | '\n' | '\r' => pos += 1,
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                pos += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                pos += 1;
            }
            '"' => {
                let start = pos;
                pos += 1;
                let mut escape_next = false;
                loop {
                    let Some(&c) = chars.get(pos) else {
                        return Err(ScimError::invalid_filter(format!(
                            "unterminated string literal in '{input}'"
                        )));
                    };
                    pos += 1;
                    if escape_next {
                        escape_next = false;
                    } else if c == '\\' {
                        escape_next = true;
                    } else if c == '"' {
                        break;
                    }
                }
                let raw: String = chars[start..pos].iter().collect();
                let decoded: String = serde_json::from_str(&raw).map_err(|e| {
                    ScimError::invalid_filter(format!("bad string literal {raw}: {e}"))
                })?;
                tokens.push(Token::Str(decoded));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = pos;
                pos += 1;
                while pos < chars.len()
                    && (chars[pos].is_ascii_digit()
                        || matches!(chars[pos], '.' | 'e' | 'E' | '+' | '-'))
                {
                    pos += 1;
                }
                let raw: String = chars[start..pos].iter().collect();
                let number: serde_json::Number = serde_json::from_str(&raw).map_err(|e| {
                    ScimError::invalid_filter(format!("bad number literal {raw}: {e}"))
                })?;
                tokens.push(Token::Number(number));
            }
            c if is_word_char(c) => {
                let start = pos;
                while pos < chars.len() && is_word_char(chars[pos]) {
                    pos += 1;
                }
                tokens.push(Token::Word(chars[start..pos].iter().collect()));
            }
            other => {
                return Err(ScimError::invalid_filter(format!(
                    "unexpected character '{other}' at position {pos} in '{input}'"
                )));
            }
        }
    }

    Ok(tokens)
}

struct FilterParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    input: &'a str,
}

impl<'a> FilterParser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume a keyword (case-insensitive) if it is next.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if let Some(Token::Word(word)) = self.peek()
            && word.eq_ignore_ascii_case(keyword)
        {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, token: Token, what: &str) -> ScimResult<()> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn error(&self, detail: String) -> ScimError {
        ScimError::invalid_filter(format!("{detail} in '{}'", self.input))
    }

    fn parse_or(&mut self) -> ScimResult<Filter> {
        let first = self.parse_and()?;
        let mut children = vec![first];
        while self.eat_keyword("or") {
            children.push(self.parse_and()?);
        }
        Ok(if children.len() == 1 {
            children.pop().expect("non-empty")
        } else {
            Filter::or(children)
        })
    }

    fn parse_and(&mut self) -> ScimResult<Filter> {
        let first = self.parse_not()?;
        let mut children = vec![first];
        while self.eat_keyword("and") {
            children.push(self.parse_not()?);
        }
        Ok(if children.len() == 1 {
            children.pop().expect("non-empty")
        } else {
            Filter::and(children)
        })
    }

    fn parse_not(&mut self) -> ScimResult<Filter> {
        if self.eat_keyword("not") {
            self.expect(Token::LParen, "'(' after not")?;
            let inner = self.parse_or()?;
            self.expect(Token::RParen, "')' closing not")?;
            return Ok(Filter::not(inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ScimResult<Filter> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen, "closing ')'")?;
                Ok(inner)
            }
            Some(Token::Word(word)) => {
                if is_reserved(&word) {
                    return Err(self.error(format!("unexpected keyword '{word}'")));
                }
                let path = parse_attr_path(&word, self.input)?;
                self.parse_attr_expression(path)
            }
            Some(token) => Err(self.error(format!("unexpected token {token:?}"))),
            None => Err(self.error("unexpected end of filter".to_string())),
        }
    }

    /// The operator and operand following an attribute path.
    fn parse_attr_expression(&mut self, path: Path) -> ScimResult<Filter> {
        if self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            let predicate = self.parse_or()?;
            self.expect(Token::RBracket, "closing ']'")?;
            return Ok(Filter::complex(path, predicate));
        }

        let Some(Token::Word(op)) = self.next() else {
            return Err(self.error(format!("expected operator after '{path}'")));
        };
        let op = op.to_ascii_lowercase();
        if op == "pr" {
            return Ok(Filter::pr(path));
        }

        let value = self.parse_literal()?;
        Ok(match op.as_str() {
            "eq" => Filter::eq(path, value),
            "ne" => Filter::ne(path, value),
            "co" => Filter::co(path, value),
            "sw" => Filter::sw(path, value),
            "ew" => Filter::ew(path, value),
            "gt" => Filter::gt(path, value),
            "ge" => Filter::ge(path, value),
            "lt" => Filter::lt(path, value),
            "le" => Filter::le(path, value),
            other => return Err(self.error(format!("unknown operator '{other}'"))),
        })
    }

    fn parse_literal(&mut self) -> ScimResult<Value> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Value::String(s)),
            Some(Token::Number(n)) => Ok(Value::Number(n)),
            Some(Token::Word(word)) => match word.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                other => Err(self.error(format!("expected literal value, found '{other}'"))),
            },
            Some(token) => Err(self.error(format!("expected literal value, found {token:?}"))),
            None => Err(self.error("expected literal value".to_string())),
        }
    }
}

fn is_reserved(word: &str) -> bool {
    ["and", "or", "not", "eq", "ne", "co", "sw", "ew", "pr", "gt", "ge", "lt", "le"]
        .iter()
        .any(|k| word.eq_ignore_ascii_case(k))
}

/// An attribute path token inside a filter: dotted names with an optional
/// URN prefix, never a value filter.
fn parse_attr_path(word: &str, input: &str) -> ScimResult<Path> {
    let path: Path = word
        .parse()
        .map_err(|e: ScimError| ScimError::invalid_filter(format!("{e} in '{input}'")))?;
    if path.is_root() {
        return Err(ScimError::invalid_filter(format!(
            "expected attribute path, found '{word}' in '{input}'"
        )));
    }
    Ok(path)
}

/// Parse a complete filter string.
pub(crate) fn parse_filter(input: &str) -> ScimResult<Filter> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ScimError::invalid_filter("empty filter"));
    }
    let mut parser = FilterParser {
        tokens,
        pos: 0,
        input,
    };
    let filter = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.error("trailing tokens".to_string()));
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precedence_and_binds_tighter_than_or() {
        let filter = parse_filter("a eq 1 and b eq 2 or c eq 3").unwrap();
        let Filter::Or(children) = &filter else {
            panic!("expected or at top: {filter:?}");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], Filter::And(_)));
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        let filter = parse_filter("a eq 1 and (b eq 2 or c eq 3)").unwrap();
        let Filter::And(children) = &filter else {
            panic!("expected and at top: {filter:?}");
        };
        assert!(matches!(children[1], Filter::Or(_)));
    }

    #[test]
    fn test_not_requires_grouping() {
        assert!(parse_filter("not (title pr)").is_ok());
        assert!(parse_filter("not title pr").is_err());
    }

    #[test]
    fn test_string_literal_escapes() {
        let filter = parse_filter(r#"displayName eq "say \"hi\"""#).unwrap();
        assert_eq!(filter.comparison_value().unwrap(), &json!("say \"hi\""));
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            parse_filter("active eq true").unwrap().comparison_value(),
            Some(&json!(true))
        );
        assert_eq!(
            parse_filter("count lt 3.14").unwrap().comparison_value(),
            Some(&json!(3.14))
        );
        assert_eq!(
            parse_filter("balance gt -2").unwrap().comparison_value(),
            Some(&json!(-2))
        );
        assert_eq!(
            parse_filter("title eq null").unwrap().comparison_value(),
            Some(&Value::Null)
        );
    }

    #[test]
    fn test_operators_case_insensitive() {
        assert_eq!(
            parse_filter("userName EQ \"x\"").unwrap(),
            parse_filter("userName eq \"x\"").unwrap()
        );
        assert_eq!(
            parse_filter("a eq 1 AND b eq 2").unwrap(),
            parse_filter("a eq 1 and b eq 2").unwrap()
        );
    }

    #[test]
    fn test_urn_prefixed_attribute() {
        let filter = parse_filter(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department eq \"Sales\"",
        )
        .unwrap();
        let path = filter.attribute_path().unwrap();
        assert_eq!(
            path.schema_urn().unwrap(),
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
        );
        assert_eq!(path.segments()[0].attribute(), "department");
    }

    #[test]
    fn test_complex_value_filter() {
        let filter =
            parse_filter("emails[type eq \"work\" and value co \"@example.com\"]").unwrap();
        let Filter::Complex(path, predicate) = filter else {
            panic!("expected complex");
        };
        assert_eq!(path.to_string(), "emails");
        assert!(matches!(*predicate, Filter::And(_)));
    }
}
