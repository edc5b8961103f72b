//! Rendering a [`Map`] back into the ISL concrete syntax [`super::parser`]
//! accepts, so that `parse(print(x))` recovers an equivalent `Map`.
//!
//! Positional names (`p0`, `i0`, `o0`, ...) stand in for any dimension
//! with no interned [`crate::ctx::Id`]; local divs are not printable in
//! this grammar (no `exists`/`floor` sugar, see [`super`]) and are
//! silently dropped from the constraint text, a known limitation for
//! `BasicMap`s carrying unresolved divs.

use presburger_bigint::BigInt;

use crate::basic_map::BasicMap;
use crate::ctx::Context;
use crate::map::Map;
use crate::space::Space;

/// Print `map` in the ISL concrete syntax.
#[must_use]
pub fn print_isl(map: &Map, ctx: &Context) -> String {
    let space = map.space();
    let param_names = names(space.n_param(), "p", |i| space.param_id(i), ctx);
    let in_names = names(space.n_in(), "i", |i| space.in_id(i), ctx);
    let out_names = names(space.n_out(), "o", |i| space.out_id(i), ctx);

    let mut out = String::new();
    if !param_names.is_empty() {
        out.push('[');
        out.push_str(&param_names.join(", "));
        out.push_str("] -> ");
    }
    out.push_str("{ ");
    let disjuncts: Vec<String> = map
        .basic_maps()
        .iter()
        .map(|bmap| print_disjunct(bmap, &param_names, &in_names, &out_names))
        .collect();
    out.push_str(&disjuncts.join("; "));
    out.push_str(" }");
    out
}

fn names(n: usize, prefix: &str, id_at: impl Fn(usize) -> Option<crate::ctx::Id>, ctx: &Context) -> Vec<String> {
    (0..n)
        .map(|i| match id_at(i) {
            Some(id) => ctx.id_name(id).to_string(),
            None => format!("{prefix}{i}"),
        })
        .collect()
}

fn print_disjunct(bmap: &BasicMap, param_names: &[String], in_names: &[String], out_names: &[String]) -> String {
    let mut out = String::new();
    if !in_names.is_empty() {
        out.push('[');
        out.push_str(&in_names.join(", "));
        out.push_str("] -> ");
    }
    out.push('[');
    out.push_str(&out_names.join(", "));
    out.push(']');

    let var_names: Vec<String> = param_names.iter().chain(in_names).chain(out_names).cloned().collect();
    let mut constraints = Vec::with_capacity(bmap.n_eq() + bmap.n_ineq());
    for i in 0..bmap.n_eq() {
        constraints.push(format!("{} = 0", render_affine(bmap.eq_row(i), &var_names)));
    }
    for i in 0..bmap.n_ineq() {
        constraints.push(format!("{} >= 0", render_affine(bmap.ineq_row(i), &var_names)));
    }
    if !constraints.is_empty() {
        out.push_str(" : ");
        out.push_str(&constraints.join(" and "));
    }
    out
}

/// Render a constraint row's leading `1 + var_names.len()` columns
/// (const, then one per name) as a signed sum of terms; any trailing div
/// columns beyond `var_names.len()` are dropped (see module docs).
fn render_affine(row: &[BigInt], var_names: &[String]) -> String {
    let mut parts: Vec<(bool, String)> = Vec::new();
    if !row[0].is_zero() {
        parts.push((row[0].is_negative(), row[0].abs().to_string()));
    }
    for (i, name) in var_names.iter().enumerate() {
        let c = &row[1 + i];
        if c.is_zero() {
            continue;
        }
        let abs = c.abs();
        let text = if abs == BigInt::one() { name.clone() } else { format!("{abs}*{name}") };
        parts.push((c.is_negative(), text));
    }
    if parts.is_empty() {
        return "0".to_string();
    }
    let mut rendered = String::new();
    for (i, (neg, text)) in parts.iter().enumerate() {
        if i == 0 {
            if *neg {
                rendered.push('-');
            }
            rendered.push_str(text);
        } else {
            rendered.push_str(if *neg { " - " } else { " + " });
            rendered.push_str(text);
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Context;

    #[test]
    fn prints_a_bounded_set_with_synthesized_names() {
        let mut bmap = BasicMap::universe(Space::set(0, 1));
        bmap.add_inequality(vec![BigInt::zero(), BigInt::one()]);
        bmap.add_inequality(vec![BigInt::from_i64(10), BigInt::minus_one()]);
        let map = Map::from_basic_map(Space::set(0, 1), bmap);
        let ctx = Context::new();
        let text = print_isl(&map, &ctx);
        assert!(text.contains("o0"));
        assert!(text.contains(">= 0"));
    }

    #[test]
    fn prints_params_header_only_when_present() {
        let map = Map::universe(Space::set(0, 1));
        let ctx = Context::new();
        assert!(!print_isl(&map, &ctx).contains("->"));
    }
}
