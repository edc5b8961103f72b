//! The ISL concrete textual syntax, implemented only as far as needed to
//! round-trip a [`crate::set::Set`] or [`crate::map::Map`]: a bounded
//! affine conjunction/disjunction grammar with named tuples and
//! parameters.
//!
//! ```text
//! [param, ...] -> { [in, ...] -> [out, ...] : constraint (and constraint)* }
//! ```
//! with `;` separating disjuncts and a set omitting the `in -> out` arrow.
//! `exists (... = floor(.../d) : ...)` existentials and the `min`/`max`/
//! `mod` sugar are not implemented here — see `DESIGN.md`. The
//! `omega`/`polylib`/`latex` output formats are out of scope; only `isl`
//! is produced by [`print_map`].

mod lexer;
mod parser;
mod printer;

use crate::ctx::Context;
pub use crate::ctx::OutputFormat;
use crate::error::FormatError;
use crate::map::Map;

/// Parse `input` as a `Map` (or `Set`, which is just a map with no input
/// tuple) in the ISL concrete syntax.
///
/// # Errors
/// Returns a [`FormatError`] on any lexical or grammatical problem.
pub fn parse_map(input: &str, ctx: &mut Context) -> Result<Map, FormatError> {
    let tokens = lexer::lex(input)?;
    parser::parse_union_map(&tokens, ctx)
}

/// Print `map` in the ISL concrete syntax (the only [`OutputFormat`]
/// variant fully implemented; the others return
/// [`FormatError::Unsupported`]).
///
/// # Errors
/// Returns [`FormatError::Unsupported`] for any format other than
/// [`OutputFormat::Isl`].
pub fn print_map(map: &Map, ctx: &Context, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Isl => Ok(printer::print_isl(map, ctx)),
        other => Err(FormatError::Unsupported { what: format!("{other:?} output") }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    #[test]
    fn round_trips_a_simple_set() {
        let mut ctx = Context::new();
        let parsed = parse_map("{ [i] : 0 <= i and i <= 10 }", &mut ctx).expect("should parse");
        assert_eq!(parsed.space().n_total(), 1);
        let printed = print_map(&parsed, &ctx, OutputFormat::Isl).expect("should print");
        let reparsed = parse_map(&printed, &mut ctx).expect("re-parse should succeed");
        assert_eq!(reparsed.n_basic_map(), parsed.n_basic_map());
    }

    #[test]
    fn round_trips_a_parametric_map() {
        let mut ctx = Context::new();
        let src = "[n] -> { [i] -> [j] : j = i + 1 and 0 <= i and i <= n }";
        let parsed = parse_map(src, &mut ctx).expect("should parse");
        assert_eq!(parsed.space().n_param(), 1);
        assert_eq!(parsed.space().n_in(), 1);
        assert_eq!(parsed.space().n_out(), 1);
    }

    #[test]
    fn disjuncts_are_separated_by_semicolons() {
        let mut ctx = Context::new();
        let parsed = parse_map("{ [i] : i = 0; [i] : i = 5 }", &mut ctx).expect("should parse");
        assert_eq!(parsed.n_basic_map(), 2);
    }

    #[test]
    fn rejects_empty_input() {
        let mut ctx = Context::new();
        let err = parse_map("", &mut ctx).unwrap_err();
        assert_eq!(err, FormatError::EmptyInput);
    }
}
