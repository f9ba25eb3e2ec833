use crate::common::defs::*;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Grid of values with one decimal; states without a value print as `x`.
pub fn render_values(cols: usize, n_s: usize, v: &BTreeMap<Discrete, Continous>) -> String {
    render_grid(cols, n_s, |s| v.get(&s).map(|x| format!("{x:.1}")))
}

/// Grid of action ids; states without an action print as `x`.
pub fn render_policy(cols: usize, n_s: usize, pi: &BTreeMap<Discrete, Discrete>) -> String {
    render_grid(cols, n_s, |s| pi.get(&s).map(|a| a.to_string()))
}

fn render_grid<F>(cols: usize, n_s: usize, cell: F) -> String
where
    F: Fn(Discrete) -> Option<String>,
{
    let rows = (0..n_s).chunks(cols.max(1));
    let mut out = String::new();
    for row in &rows {
        out.push_str(&row.map(|s| cell(s).unwrap_or_else(|| "x".to_string())).join("\t"));
        out.push('\n');
    }
    out
}
