//! Integer-literal parsing for operands: decimal, `0x`-hex or `0b`-binary,
//! optionally negated, parsed as a signed value and left for the caller to
//! range-check against the field it targets.

use pest::iterators::Pair;

use crate::error::AssembleError;
use crate::parser::Rule;

pub fn parse_int_literal(pair: Pair<Rule>, line: usize) -> Result<i32, AssembleError> {
    let text = pair.as_str();
    let (negative, unsigned_text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let magnitude = if let Some(hex) = unsigned_text.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = unsigned_text.strip_prefix("0b") {
        u32::from_str_radix(bin, 2)
    } else {
        unsigned_text.parse::<u32>()
    }
    .map_err(|_| lex_error(pair.as_span(), line, format!("malformed numeric literal '{text}'")))?;

    let value = magnitude as i64 * if negative { -1 } else { 1 };
    i32::try_from(value)
        .map_err(|_| lex_error(pair.as_span(), line, format!("numeric literal '{text}' out of range")))
}

fn lex_error(span: pest::Span, line: usize, message: String) -> AssembleError {
    let err = pest::error::Error::new_from_span(
        pest::error::ErrorVariant::<Rule>::CustomError { message },
        span,
    );
    AssembleError::Lex {
        line,
        source: Box::new(err),
    }
}
