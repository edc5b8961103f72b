//! Recursive-descent parser driving [`super::lexer`]'s tokens into a
//! [`Map`], against the grammar documented on [`super`].

use std::collections::HashMap;

use presburger_bigint::BigInt;

use crate::basic_map::BasicMap;
use crate::ctx::Context;
use crate::error::FormatError;
use crate::format::lexer::{Spanned, Token};
use crate::local_space::LocalSpace;
use crate::map::Map;
use crate::space::Space;

/// A flat affine expression gathered while parsing: a constant plus a
/// coefficient per named variable, resolved against the active scope
/// once a full constraint has been read.
#[derive(Debug, Clone, Default)]
struct RawAffine {
    constant: BigInt,
    coeffs: HashMap<String, BigInt>,
}

impl RawAffine {
    fn add_term(&mut self, name: Option<&str>, coeff: BigInt) {
        match name {
            None => self.constant = &self.constant + &coeff,
            Some(n) => match self.coeffs.get_mut(n) {
                Some(existing) => *existing = &*existing + &coeff,
                None => {
                    self.coeffs.insert(n.to_string(), coeff);
                }
            },
        }
    }

    fn sub(&self, other: &RawAffine) -> RawAffine {
        let mut out = self.clone();
        out.constant = &out.constant - &other.constant;
        for (name, coeff) in &other.coeffs {
            out.add_term(Some(name), coeff.negate());
        }
        out
    }
}

enum RawCmp {
    Eq,
    Le,
    Ge,
    Lt,
    Gt,
    Ne,
}

struct RawConstraint {
    left: RawAffine,
    cmp: RawCmp,
    right: RawAffine,
}

/// Variable name -> combined column index, built from a parameter
/// declaration plus one disjunct's tuple names.
struct Scope {
    index: HashMap<String, usize>,
    n_param: usize,
    n_in: usize,
    n_out: usize,
}

struct Cursor<'a> {
    toks: &'a [Spanned],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos).map(|s| &s.token)
    }

    fn pos_of_next(&self) -> usize {
        self.toks.get(self.pos).map_or(usize::MAX, |s| s.pos)
    }

    /// Consume and return the next token by value, so call sites never
    /// hold a borrow of `self` past the call.
    fn bump(&mut self) -> Option<Token> {
        let t = self.toks.get(self.pos).map(|s| s.token.clone());
        self.pos += 1;
        t
    }

    fn expect(&mut self, want: &Token, what: &str) -> Result<(), FormatError> {
        let pos = self.pos_of_next();
        match self.bump() {
            Some(ref t) if t == want => Ok(()),
            Some(other) => Err(FormatError::UnexpectedToken {
                expected: what.to_string(),
                got: format!("{other:?}"),
                pos,
            }),
            None => Err(FormatError::UnexpectedEndOfInput),
        }
    }

    fn expect_ident(&mut self) -> Result<String, FormatError> {
        let pos = self.pos_of_next();
        match self.bump() {
            Some(Token::Ident(s)) => Ok(s),
            Some(other) => Err(FormatError::UnexpectedToken {
                expected: "identifier".to_string(),
                got: format!("{other:?}"),
                pos,
            }),
            None => Err(FormatError::UnexpectedEndOfInput),
        }
    }
}

/// Parse a full `[params ->] { disjunct (; disjunct)* }` program into a
/// `Map`.
///
/// # Errors
/// Any [`FormatError`] variant; see [`super::lex`] and the per-production
/// parsing functions.
pub fn parse_union_map(toks: &[Spanned], ctx: &mut Context) -> Result<Map, FormatError> {
    if toks.is_empty() {
        return Err(FormatError::EmptyInput);
    }
    let mut cur = Cursor { toks, pos: 0 };

    let params = if matches!(cur.peek(), Some(Token::LBracket)) {
        let names = parse_ident_bracket_list(&mut cur)?;
        cur.expect(&Token::Arrow, "'->'")?;
        names
    } else {
        Vec::new()
    };

    cur.expect(&Token::LBrace, "'{'")?;

    let mut space: Option<Space> = None;
    let mut basic_maps = Vec::new();
    loop {
        let (disjunct_space, bmaps) = parse_disjunct(&mut cur, &params, ctx)?;
        match &space {
            None => space = Some(disjunct_space),
            Some(existing) => {
                if existing != &disjunct_space {
                    return Err(FormatError::UnexpectedToken {
                        expected: "a disjunct over the same tuple shape".to_string(),
                        got: "a differently-shaped disjunct".to_string(),
                        pos: cur.pos_of_next(),
                    });
                }
            }
        }
        basic_maps.extend(bmaps);
        match cur.peek() {
            Some(Token::Semicolon) => {
                cur.bump();
            }
            _ => break,
        }
    }
    cur.expect(&Token::RBrace, "'}'")?;

    let space = space.unwrap_or_else(|| Space::set(params.len(), 0));
    let mut map = Map::empty(space);
    for bmap in basic_maps {
        map.add_basic_map(bmap);
    }
    Ok(map)
}

fn parse_ident_bracket_list(cur: &mut Cursor) -> Result<Vec<String>, FormatError> {
    cur.expect(&Token::LBracket, "'['")?;
    let mut names = Vec::new();
    if !matches!(cur.peek(), Some(Token::RBracket)) {
        names.push(cur.expect_ident()?);
        while matches!(cur.peek(), Some(Token::Comma)) {
            cur.bump();
            names.push(cur.expect_ident()?);
        }
    }
    cur.expect(&Token::RBracket, "']'")?;
    Ok(names)
}

/// `tuple ["->" tuple] [":" constraints]` — one disjunct, possibly
/// expanded into several `BasicMap`s if it used `!=` or top-level `or`.
fn parse_disjunct(cur: &mut Cursor, params: &[String], ctx: &mut Context) -> Result<(Space, Vec<BasicMap>), FormatError> {
    let first_tuple = parse_tuple(cur)?;
    let (in_names, out_names, n_in, n_out, is_map) = if matches!(cur.peek(), Some(Token::Arrow)) {
        cur.bump();
        let second_tuple = parse_tuple(cur)?;
        let n_in = first_tuple.len();
        (first_tuple, second_tuple.clone(), n_in, second_tuple.len(), true)
    } else {
        (Vec::new(), first_tuple.clone(), 0, first_tuple.len(), false)
    };

    let mut index = HashMap::new();
    for (i, name) in params.iter().enumerate() {
        index.insert(name.clone(), i);
    }
    for (i, name) in in_names.iter().enumerate() {
        index.insert(name.clone(), params.len() + i);
    }
    for (i, name) in out_names.iter().enumerate() {
        index.insert(name.clone(), params.len() + n_in + i);
    }
    let scope = Scope { index, n_param: params.len(), n_in, n_out };

    let constraints = if matches!(cur.peek(), Some(Token::Colon)) {
        cur.bump();
        parse_constraint_list(cur)?
    } else {
        Vec::new()
    };

    let space = if is_map { Space::map(params.len(), n_in, n_out) } else { Space::set(params.len(), n_out) };
    let _ = ctx;

    let bmap = build_basic_maps(&space, &scope, &constraints)?;
    Ok((space, bmap))
}

/// `[name] "[" ident ("," ident)* "]"` — a tuple declaration; an empty
/// `[]` (a 0-dimensional tuple) is allowed.
fn parse_tuple(cur: &mut Cursor) -> Result<Vec<String>, FormatError> {
    if matches!(cur.peek(), Some(Token::Ident(_))) {
        cur.bump(); // tuple name, not tracked as a Space id in this minimal grammar
    }
    cur.expect(&Token::LBracket, "'['")?;
    let mut names = Vec::new();
    if !matches!(cur.peek(), Some(Token::RBracket)) {
        names.push(cur.expect_ident()?);
        while matches!(cur.peek(), Some(Token::Comma)) {
            cur.bump();
            names.push(cur.expect_ident()?);
        }
    }
    cur.expect(&Token::RBracket, "']'")?;
    Ok(names)
}

fn parse_constraint_list(cur: &mut Cursor) -> Result<Vec<RawConstraint>, FormatError> {
    let mut out = vec![parse_constraint(cur)?];
    loop {
        match cur.peek() {
            Some(Token::And) | Some(Token::Comma) => {
                cur.bump();
                out.push(parse_constraint(cur)?);
            }
            _ => break,
        }
    }
    Ok(out)
}

fn parse_constraint(cur: &mut Cursor) -> Result<RawConstraint, FormatError> {
    let left = parse_affine(cur)?;
    let pos = cur.pos_of_next();
    let cmp = match cur.bump() {
        Some(Token::Eq) => RawCmp::Eq,
        Some(Token::Le) => RawCmp::Le,
        Some(Token::Ge) => RawCmp::Ge,
        Some(Token::Lt) => RawCmp::Lt,
        Some(Token::Gt) => RawCmp::Gt,
        Some(Token::Ne) => RawCmp::Ne,
        Some(other) => {
            return Err(FormatError::UnexpectedToken {
                expected: "a comparison operator".to_string(),
                got: format!("{other:?}"),
                pos,
            });
        }
        None => return Err(FormatError::UnexpectedEndOfInput),
    };
    let right = parse_affine(cur)?;
    Ok(RawConstraint { left, cmp, right })
}

fn parse_affine(cur: &mut Cursor) -> Result<RawAffine, FormatError> {
    let mut out = RawAffine::default();
    let mut sign = BigInt::one();
    if matches!(cur.peek(), Some(Token::Minus)) {
        cur.bump();
        sign = BigInt::minus_one();
    } else if matches!(cur.peek(), Some(Token::Plus)) {
        cur.bump();
    }
    parse_term(cur, &sign, &mut out)?;
    loop {
        match cur.peek() {
            Some(Token::Plus) => {
                cur.bump();
                parse_term(cur, &BigInt::one(), &mut out)?;
            }
            Some(Token::Minus) => {
                cur.bump();
                parse_term(cur, &BigInt::minus_one(), &mut out)?;
            }
            _ => break,
        }
    }
    Ok(out)
}

fn parse_term(cur: &mut Cursor, sign: &BigInt, out: &mut RawAffine) -> Result<(), FormatError> {
    let mut coeff = sign.clone();
    let mut has_int = false;
    if let Some(Token::Int(digits)) = cur.peek() {
        let v = BigInt::parse(digits).map_err(|_| FormatError::InvalidToken { token: digits.clone(), pos: cur.pos_of_next() })?;
        coeff = &coeff * &v;
        has_int = true;
        cur.bump();
        if matches!(cur.peek(), Some(Token::Star)) {
            cur.bump();
        }
    }
    if let Some(Token::Ident(name)) = cur.peek() {
        let name = name.clone();
        cur.bump();
        out.add_term(Some(&name), coeff);
        return Ok(());
    }
    if !has_int {
        let pos = cur.pos_of_next();
        return Err(match cur.bump() {
            Some(other) => FormatError::UnexpectedToken {
                expected: "a number or identifier".to_string(),
                got: format!("{other:?}"),
                pos,
            },
            None => FormatError::UnexpectedEndOfInput,
        });
    }
    out.add_term(None, coeff);
    Ok(())
}

/// Turn a parsed disjunct's constraint list into one or more
/// `BasicMap`s over `space`, resolving each variable name through
/// `scope` and expanding any `!=` constraint into two disjuncts (`<` and
/// `>`), since disequality is not a single convex constraint.
fn build_basic_maps(space: &Space, scope: &Scope, constraints: &[RawConstraint]) -> Result<Vec<BasicMap>, FormatError> {
    let mut bmaps = vec![BasicMap::universe(space.clone())];
    for c in constraints {
        let diff = c.left.sub(&c.right);
        let row = to_row(scope, &diff)?;
        match c.cmp {
            RawCmp::Eq => {
                for b in &mut bmaps {
                    b.add_equality(row.clone());
                }
            }
            RawCmp::Ge => {
                for b in &mut bmaps {
                    b.add_inequality(row.clone());
                }
            }
            RawCmp::Le => {
                let neg: Vec<BigInt> = row.iter().map(BigInt::negate).collect();
                for b in &mut bmaps {
                    b.add_inequality(neg.clone());
                }
            }
            RawCmp::Gt => {
                let mut r = row.clone();
                r[0] = &r[0] - &BigInt::one();
                for b in &mut bmaps {
                    b.add_inequality(r.clone());
                }
            }
            RawCmp::Lt => {
                let mut r: Vec<BigInt> = row.iter().map(BigInt::negate).collect();
                r[0] = &r[0] - &BigInt::one();
                for b in &mut bmaps {
                    b.add_inequality(r.clone());
                }
            }
            RawCmp::Ne => {
                let mut gt = row.clone();
                gt[0] = &gt[0] - &BigInt::one();
                let mut lt: Vec<BigInt> = row.iter().map(BigInt::negate).collect();
                lt[0] = &lt[0] - &BigInt::one();
                let mut expanded = Vec::with_capacity(bmaps.len() * 2);
                for b in &bmaps {
                    let mut left = b.clone();
                    left.add_inequality(gt.clone());
                    expanded.push(left);
                    let mut right = b.clone();
                    right.add_inequality(lt.clone());
                    expanded.push(right);
                }
                bmaps = expanded;
            }
        }
    }
    Ok(bmaps)
}

fn to_row(scope: &Scope, affine: &RawAffine) -> Result<Vec<BigInt>, FormatError> {
    let ls = LocalSpace::new(Space::map(scope.n_param, scope.n_in, scope.n_out));
    let mut row = vec![BigInt::zero(); ls.constraint_len()];
    row[0] = affine.constant.clone();
    for (name, coeff) in &affine.coeffs {
        let Some(&idx) = scope.index.get(name) else {
            return Err(FormatError::UnexpectedToken {
                expected: "a declared dimension or parameter name".to_string(),
                got: name.clone(),
                pos: 0,
            });
        };
        row[1 + idx] = coeff.clone();
    }
    Ok(row)
}
