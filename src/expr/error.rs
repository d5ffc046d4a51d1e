//! Error types for formula parsing and evaluation

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use super::lexer::{Span, Token};

/// Malformed formula text
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("syntax error in '{expr}' at {span:?}: {message}")]
    Syntax {
        expr: String,
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    pub fn syntax(expr: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            expr: expr.into(),
            span,
            message: message.into(),
            expected: vec![],
        }
    }

    /// The formula text the error occurred in
    pub fn expr(&self) -> &str {
        match self {
            ParseError::Syntax { expr, .. } => expr,
        }
    }

    /// Byte range of the offending token
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with the formula as source context using ariadne
    pub fn format(&self) -> String {
        let ParseError::Syntax {
            expr,
            span,
            message,
            expected,
        } = self;

        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };

        let mut buf = Vec::new();
        let _ = Report::build(ReportKind::Error, "formula", span.start)
            .with_message(message)
            .with_label(
                Label::new(("formula", span.clone()))
                    .with_message(format!("{}{}", message, expected_str))
                    .with_color(Color::Red),
            )
            .finish()
            .write(("formula", Source::from(expr.as_str())), &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Convert a chumsky error, attaching the original formula text
    pub(crate) fn from_rich(err: chumsky::error::Rich<'_, Token>, expr: &str) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("unexpected {}", format_token(tok)),
                None => "unexpected end of formula".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of formula".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            expr: expr.to_string(),
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::Number(n) => format!("number {}", n),
        Token::True => "'true'".to_string(),
        Token::False => "'false'".to_string(),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Less => "'<'".to_string(),
        Token::LessEqual => "'<='".to_string(),
        Token::Greater => "'>'".to_string(),
        Token::GreaterEqual => "'>='".to_string(),
        Token::EqualEqual => "'=='".to_string(),
        Token::NotEqual => "'!='".to_string(),
        Token::AndAnd => "'&&'".to_string(),
        Token::OrOr => "'||'".to_string(),
        Token::Bang => "'!'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::Comma => "','".to_string(),
    }
}

/// A formula that parsed but could not be evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The formula references a variable that is not bound
    #[error("unresolved identifier '{0}'")]
    Unresolved(String),

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,

    /// An operator or context received a value of the wrong kind
    #[error("expected a {expected} value, got a {actual} value")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A builtin was called with the wrong number of arguments
    #[error("{function} expects {expected} argument(s), got {actual}")]
    Arity {
        function: &'static str,
        expected: &'static str,
        actual: usize,
    },
}

impl EvalError {
    /// The identifier involved, for unresolved-variable errors
    pub fn identifier(&self) -> Option<&str> {
        match self {
            EvalError::Unresolved(name) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = ParseError::syntax("1 +", 3..3, "unexpected end of formula");
        assert!(err.to_string().contains("1 +"));
        assert!(err.to_string().contains("unexpected end"));
    }

    #[test]
    fn test_format_renders_source_context() {
        let err = ParseError::syntax("width + ", 8..8, "unexpected end of formula");
        let report = err.format();
        assert!(report.contains("formula"));
    }

    #[test]
    fn test_eval_error_identifier() {
        let err = EvalError::Unresolved("shelf_top".to_string());
        assert_eq!(err.identifier(), Some("shelf_top"));
        assert_eq!(EvalError::DivisionByZero.identifier(), None);
    }
}
