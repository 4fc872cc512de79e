// Shared token parsers for the axis option language

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::multispace0,
    combinator::{recognize, value},
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser so it skips surrounding whitespace.
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Letter or underscore, then alphanumerics or underscores.
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))(input)
}

/// Decimal or scientific number, also `inf`.
pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

pub fn bool_literal(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("true")), value(false, tag("false"))))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_literal() {
        assert_eq!(number_literal("2.5"), Ok(("", 2.5)));
        assert_eq!(number_literal("-1e-3)"), Ok((")", -0.001)));
        assert!(number_literal("abc").is_err());
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("dotted)"), Ok((")", "dotted")));
        assert!(identifier("1abc").is_err());
    }

    #[test]
    fn test_bool_and_ws() {
        assert_eq!(ws(bool_literal)("  true  |"), Ok(("|", true)));
        assert_eq!(bool_literal("false"), Ok(("", false)));
    }
}
