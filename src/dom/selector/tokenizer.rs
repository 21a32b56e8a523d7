//! logos-based selector tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `:hover` as PseudoClass beats `:` + `hover`)
//! 2. For equal length matches, earlier-defined variants win

use logos::Logos;

/// Selector token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// Pseudo-class: `:hover`, `:focus`. Recognised only to be rejected.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoClass,

    /// Double-quoted string literal.
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^']*'")]
    StringLiteralSingle,

    /// Identifier: tag names, class names, ids, attribute names.
    #[regex(r"[a-zA-Z_-][a-zA-Z0-9_-]*")]
    Ident,

    /// Unquoted value starting with a digit, as in `[data-index=2]`.
    #[regex(r"[0-9][a-zA-Z0-9_.-]*")]
    Number,

    // ── Single-character punctuation ─────────────────────────────────

    /// `[`
    #[token("[")]
    BracketOpen,

    /// `]`
    #[token("]")]
    BracketClose,

    /// `=`
    #[token("=")]
    Equals,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `#`
    #[token("#")]
    Hash,

    /// `*`
    #[token("*")]
    Star,

    /// `>`
    #[token(">")]
    GreaterThan,
}

/// Tokenize a selector into `(Token, text)` pairs, skipping characters that fail to lex.
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    Token::lexer(input)
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, input[span].to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            tokens("[ ] = , . # * >"),
            vec![
                Token::BracketOpen,
                Token::BracketClose,
                Token::Equals,
                Token::Comma,
                Token::Dot,
                Token::Hash,
                Token::Star,
                Token::GreaterThan,
            ]
        );
    }

    #[test]
    fn hyphenated_identifiers() {
        let toks = tokenize("data-coral-accordion-trigger");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0], (Token::Ident, "data-coral-accordion-trigger".to_string()));
    }

    #[test]
    fn attribute_selector() {
        assert_eq!(
            tokens(r#"[data-side="left"]"#),
            vec![
                Token::BracketOpen,
                Token::Ident,
                Token::Equals,
                Token::StringLiteral,
                Token::BracketClose,
            ]
        );
    }

    #[test]
    fn numeric_value() {
        assert_eq!(
            tokens("[data-index=2]"),
            vec![
                Token::BracketOpen,
                Token::Ident,
                Token::Equals,
                Token::Number,
                Token::BracketClose,
            ]
        );
    }

    #[test]
    fn pseudo_class_beats_colon() {
        assert_eq!(tokens("button:hover"), vec![Token::Ident, Token::PseudoClass]);
    }

    #[test]
    fn id_after_hash() {
        let toks = tokenize("#accordion-trigger-3");
        assert_eq!(toks[0].0, Token::Hash);
        assert_eq!(toks[1], (Token::Ident, "accordion-trigger-3".to_string()));
    }
}
