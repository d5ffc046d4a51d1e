//! Lexer for formula expressions using logos

use logos::Logos;

/// Byte range in formula text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Boolean literals
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Arithmetic operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // Comparison operators (longer patterns first)
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Logical operators
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

/// Lex formula text into tokens with spans.
///
/// Characters the lexer cannot match come back as `Err(span)` so the parser
/// can reject the whole formula instead of silently dropping input.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    let mut tokens = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(t) => tokens.push((t, span)),
            Err(()) => return Err(span),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_operators() {
        let tokens: Vec<_> = lex("+ - * /").unwrap().into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![Token::Plus, Token::Minus, Token::Star, Token::Slash]
        );
    }

    #[test]
    fn test_comparison_operators() {
        let tokens: Vec<_> = lex("< <= > >= == !=")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Less,
                Token::LessEqual,
                Token::Greater,
                Token::GreaterEqual,
                Token::EqualEqual,
                Token::NotEqual,
            ]
        );
    }

    #[test]
    fn test_logical_operators() {
        let tokens: Vec<_> = lex("&& || !").unwrap().into_iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::AndAnd, Token::OrOr, Token::Bang]);
    }

    #[test]
    fn test_identifiers_and_numbers() {
        let tokens: Vec<_> = lex("width - 32.5")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("width".to_string()),
                Token::Minus,
                Token::Number(32.5),
            ]
        );
    }

    #[test]
    fn test_boolean_keywords() {
        let tokens: Vec<_> = lex("true false trueish")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![Token::True, Token::False, Token::Ident("trueish".to_string())]
        );
    }

    #[test]
    fn test_call_syntax() {
        let tokens: Vec<_> = lex("min(a, b)")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("min".to_string()),
                Token::ParenOpen,
                Token::Ident("a".to_string()),
                Token::Comma,
                Token::Ident("b".to_string()),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_unexpected_character_is_an_error() {
        let err = lex("width $ 2").unwrap_err();
        assert_eq!(err, 6..7);
    }
}
