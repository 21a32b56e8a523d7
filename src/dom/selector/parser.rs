//! Recursive descent selector parser.
//!
//! Parses selector text into a [`SelectorList`]. Uses the logos-based tokenizer
//! from [`crate::dom::selector::tokenizer`].

use logos::Logos;

use super::model::*;
use super::tokenizer::Token;

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectorError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("unrecognised character at byte {0}")]
    InvalidCharacter(usize),
    #[error("empty selector")]
    Empty,
    #[error("unsupported pseudo-class `{0}`")]
    UnsupportedPseudoClass(String),
}

/// A positioned token with byte-level span information for whitespace detection.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    /// Index in the token stream (for error reporting).
    pos: usize,
    /// Byte offset where this token starts in the source.
    byte_start: usize,
    /// Byte offset where this token ends in the source.
    byte_end: usize,
}

/// Tokenize input using logos with span information preserved.
fn tokenize_with_spans(input: &str) -> Result<Vec<PToken>, SelectorError> {
    let mut tokens = Vec::new();
    for (idx, (result, span)) in Token::lexer(input).spanned().enumerate() {
        let token = result.map_err(|_| SelectorError::InvalidCharacter(span.start))?;
        tokens.push(PToken {
            text: input[span.clone()].to_string(),
            token,
            pos: idx,
            byte_start: span.start,
            byte_end: span.end,
        });
    }
    Ok(tokens)
}

/// Parse a selector list such as `[data-coral-switch], .toggle > button`.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let tokens = tokenize_with_spans(input)?;
    if tokens.is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut parser = Parser { tokens, cursor: 0 };
    let list = parser.parse_selector_list()?;
    if let Some(tok) = parser.peek() {
        return Err(SelectorError::UnexpectedToken {
            position: tok.pos,
            message: format!("unexpected {:?} '{}'", tok.token, tok.text),
        });
    }
    Ok(list)
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.tokens.len())
    }

    /// Returns `true` if the current token is immediately adjacent (no whitespace)
    /// to the previous token.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        match self.peek() {
            Some(curr) => curr.byte_start == prev.byte_end,
            None => false,
        }
    }

    /// Parse a comma-separated list of selectors.
    fn parse_selector_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = vec![self.parse_selector()?];
        while self.peek().is_some_and(|t| t.token == Token::Comma) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }
        Ok(SelectorList { selectors })
    }

    /// Parse a single selector: compound selectors joined by combinators.
    fn parse_selector(&mut self) -> Result<Selector, SelectorError> {
        let mut parts = vec![SelectorPart::Compound(self.parse_compound_selector()?)];

        loop {
            match self.peek() {
                Some(t) if t.token == Token::GreaterThan => {
                    self.advance();
                    parts.push(SelectorPart::Combinator(Combinator::Child));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                // A selector-starting token separated by whitespace is a descendant
                // combinator; adjacent ones were consumed by the compound parser.
                Some(t)
                    if matches!(
                        t.token,
                        Token::Ident
                            | Token::Hash
                            | Token::Dot
                            | Token::Star
                            | Token::BracketOpen
                            | Token::PseudoClass
                    ) =>
                {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                _ => break,
            }
        }

        Ok(Selector { parts })
    }

    /// Parse a compound selector, e.g. `button.primary[disabled]`.
    ///
    /// Uses span-based adjacency detection: `.class`, `#id` and `[attr]` are only
    /// appended to the current compound if they follow the previous token with no
    /// whitespace gap.
    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::new();

        match self.peek().map(|t| t.token.clone()) {
            Some(Token::Ident) => {
                if let Some(tok) = self.advance() {
                    compound.push(SelectorComponent::Type(tok.text.to_ascii_lowercase()));
                }
            }
            Some(Token::Star) => {
                self.advance();
                compound.push(SelectorComponent::Universal);
            }
            Some(_) => compound.push(self.parse_simple_suffix()?),
            None => {
                return Err(SelectorError::UnexpectedEof("expected selector".into()));
            }
        }

        while self.is_adjacent()
            && self.peek().is_some_and(|t| {
                matches!(
                    t.token,
                    Token::Dot | Token::Hash | Token::BracketOpen | Token::PseudoClass
                )
            })
        {
            compound.push(self.parse_simple_suffix()?);
        }

        Ok(compound)
    }

    /// Parse one of `.class`, `#id`, `[attr]`, `[attr=value]`.
    fn parse_simple_suffix(&mut self) -> Result<SelectorComponent, SelectorError> {
        let Some(tok) = self.advance() else {
            return Err(SelectorError::UnexpectedEof("expected selector part".into()));
        };
        match tok.token {
            Token::Dot => Ok(SelectorComponent::Class(self.expect_name("class name")?)),
            Token::Hash => Ok(SelectorComponent::Id(self.expect_name("id")?)),
            Token::BracketOpen => self.parse_attribute(),
            Token::PseudoClass => Err(SelectorError::UnsupportedPseudoClass(tok.text)),
            other => Err(SelectorError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected selector part, got {:?} '{}'", other, tok.text),
            }),
        }
    }

    /// Expect an identifier immediately after `.` or `#`.
    fn expect_name(&mut self, what: &str) -> Result<String, SelectorError> {
        if !self.is_adjacent() {
            return match self.peek() {
                Some(tok) => Err(SelectorError::UnexpectedToken {
                    position: tok.pos,
                    message: format!("expected {what}"),
                }),
                None => Err(SelectorError::UnexpectedEof(format!("expected {what}"))),
            };
        }
        match self.advance() {
            Some(tok) if tok.token == Token::Ident => Ok(tok.text),
            Some(tok) => Err(SelectorError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {what}, got {:?} '{}'", tok.token, tok.text),
            }),
            None => Err(SelectorError::UnexpectedEof(format!("expected {what}"))),
        }
    }

    /// Parse the remainder of `[name]` or `[name=value]` after `[`.
    fn parse_attribute(&mut self) -> Result<SelectorComponent, SelectorError> {
        let name = match self.advance() {
            Some(tok) if tok.token == Token::Ident => tok.text,
            Some(tok) => {
                return Err(SelectorError::UnexpectedToken {
                    position: tok.pos,
                    message: format!("expected attribute name, got '{}'", tok.text),
                })
            }
            None => return Err(SelectorError::UnexpectedEof("expected attribute name".into())),
        };

        let value = if self.peek().is_some_and(|t| t.token == Token::Equals) {
            self.advance();
            match self.advance() {
                Some(tok) => match tok.token {
                    Token::Ident | Token::Number => Some(tok.text),
                    Token::StringLiteral | Token::StringLiteralSingle => {
                        Some(tok.text[1..tok.text.len() - 1].to_string())
                    }
                    _ => {
                        return Err(SelectorError::UnexpectedToken {
                            position: tok.pos,
                            message: format!("expected attribute value, got '{}'", tok.text),
                        })
                    }
                },
                None => return Err(SelectorError::UnexpectedEof("expected attribute value".into())),
            }
        } else {
            None
        };

        match self.advance() {
            Some(tok) if tok.token == Token::BracketClose => Ok(SelectorComponent::Attribute { name, value }),
            Some(tok) => Err(SelectorError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected ']', got '{}'", tok.text),
            }),
            None => Err(SelectorError::UnexpectedEof(format!(
                "expected ']' at position {}",
                self.current_pos()
            ))),
        }
    }
}
