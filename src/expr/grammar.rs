//! Formula parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::{BinaryOp, Builtin, Expr, UnaryOp};
use super::error::ParseError;
use super::lexer::{self, Token};

/// Parse formula text into an expression tree
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = lexer::lex(input)
        .map_err(|span| ParseError::syntax(input, span, "unexpected character"))?;

    let len = input.len();
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));
    let token_stream =
        Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(e) => ParseError::from_rich(e, input),
            None => ParseError::syntax(input, 0..len, "malformed formula"),
        })
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let number = select! {
            Token::Number(n) => Expr::Number(n),
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
        };

        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        // An identifier followed by an argument list is a builtin call;
        // bare identifiers are variable references
        let call_or_variable = select! { Token::Ident(name) => name }
            .then(args.or_not())
            .try_map(|(name, args), span| match args {
                Some(args) => match Builtin::from_name(&name) {
                    Some(function) => Ok(Expr::Call { function, args }),
                    None => Err(Rich::custom(
                        span,
                        format!("unknown function '{}'", name),
                    )),
                },
                None => Ok(Expr::Variable(name)),
            });

        let atom = choice((
            number,
            call_or_variable,
            expr.clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ));

        let unary = choice((
            just(Token::Minus).to(UnaryOp::Neg),
            just(Token::Bang).to(UnaryOp::Not),
        ))
        .repeated()
        .foldr(atom, |op, operand| Expr::unary(op, operand));

        let product = unary.clone().foldl(
            choice((
                just(Token::Star).to(BinaryOp::Mul),
                just(Token::Slash).to(BinaryOp::Div),
            ))
            .then(unary)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        let sum = product.clone().foldl(
            choice((
                just(Token::Plus).to(BinaryOp::Add),
                just(Token::Minus).to(BinaryOp::Sub),
            ))
            .then(product)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        let comparison = sum.clone().foldl(
            choice((
                just(Token::LessEqual).to(BinaryOp::LessEqual),
                just(Token::GreaterEqual).to(BinaryOp::GreaterEqual),
                just(Token::EqualEqual).to(BinaryOp::Equal),
                just(Token::NotEqual).to(BinaryOp::NotEqual),
                just(Token::Less).to(BinaryOp::Less),
                just(Token::Greater).to(BinaryOp::Greater),
            ))
            .then(sum)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        let conjunction = comparison.clone().foldl(
            just(Token::AndAnd)
                .to(BinaryOp::And)
                .then(comparison)
                .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        conjunction.clone().foldl(
            just(Token::OrOr)
                .to(BinaryOp::Or)
                .then(conjunction)
                .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse("42").unwrap(), Expr::Number(42.0));
        assert_eq!(parse("3.5").unwrap(), Expr::Number(3.5));
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(parse("width").unwrap(), Expr::Variable("width".to_string()));
    }

    #[test]
    fn test_parse_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Expr::binary(
                BinaryOp::Add,
                Expr::Number(1.0),
                Expr::binary(BinaryOp::Mul, Expr::Number(2.0), Expr::Number(3.0)),
            )
        );
    }

    #[test]
    fn test_parse_parentheses_override_precedence() {
        assert_eq!(
            parse("(1 + 2) * 3").unwrap(),
            Expr::binary(
                BinaryOp::Mul,
                Expr::binary(BinaryOp::Add, Expr::Number(1.0), Expr::Number(2.0)),
                Expr::Number(3.0),
            )
        );
    }

    #[test]
    fn test_parse_unary_minus() {
        assert_eq!(
            parse("-width").unwrap(),
            Expr::unary(UnaryOp::Neg, Expr::Variable("width".to_string()))
        );
    }

    #[test]
    fn test_parse_call() {
        assert_eq!(
            parse("min(width, 600)").unwrap(),
            Expr::Call {
                function: Builtin::Min,
                args: vec![Expr::Variable("width".to_string()), Expr::Number(600.0)],
            }
        );
    }

    #[test]
    fn test_parse_unknown_function() {
        let err = parse("floor(x)").unwrap_err();
        assert!(err.to_string().contains("unknown function 'floor'"));
    }

    #[test]
    fn test_parse_boolean_expression() {
        assert_eq!(
            parse("width > 600 && has_doors == 1").unwrap(),
            Expr::binary(
                BinaryOp::And,
                Expr::binary(
                    BinaryOp::Greater,
                    Expr::Variable("width".to_string()),
                    Expr::Number(600.0),
                ),
                Expr::binary(
                    BinaryOp::Equal,
                    Expr::Variable("has_doors".to_string()),
                    Expr::Number(1.0),
                ),
            )
        );
    }

    #[test]
    fn test_parse_logical_precedence() {
        // a || b && c parses as a || (b && c)
        assert_eq!(
            parse("a || b && c").unwrap(),
            Expr::binary(
                BinaryOp::Or,
                Expr::Variable("a".to_string()),
                Expr::binary(
                    BinaryOp::And,
                    Expr::Variable("b".to_string()),
                    Expr::Variable("c".to_string()),
                ),
            )
        );
    }

    #[test]
    fn test_parse_trailing_garbage_rejected() {
        assert!(parse("1 + 2 3").is_err());
    }

    #[test]
    fn test_parse_empty_rejected() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_parse_reports_position() {
        let err = parse("width + ").unwrap_err();
        assert_eq!(err.span(), &(8..8));
    }

    #[test]
    fn test_parse_bad_character_rejected() {
        let err = parse("width # 2").unwrap_err();
        assert_eq!(err.span(), &(6..7));
    }
}
