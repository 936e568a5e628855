//! Placeholder analysis of `&(...)` shorthand captures

use rustc_hash::FxHashMap;

use crate::features::closure_analysis::domain::{CapturePlaceholder, PlaceholderAnalysis};
use crate::shared::constants::literals::MAX_CAPTURE_PLACEHOLDER;
use crate::shared::models::{Args, Ast};

#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderAnalyzer;

impl PlaceholderAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a capture: either the whole `&(...)` form or its body
    ///
    /// Nested shorthand captures own their placeholders and are not entered.
    pub fn analyze(&self, capture: &Ast) -> PlaceholderAnalysis {
        let body = match capture.call_args("&") {
            Some([inner]) if !matches!(inner, Ast::Integer(_) | Ast::BigInteger(_)) => inner,
            _ => capture,
        };

        let mut found: FxHashMap<usize, CapturePlaceholder> = FxHashMap::default();
        collect(body, &mut found);
        PlaceholderAnalysis::from_placeholders(found.into_values().collect())
    }
}

/// Position of a bare `&N` placeholder, `None` outside `1..=255`
///
/// Out-of-range placeholders are never counted, so gaps stay bounded.
pub fn placeholder_position(ast: &Ast) -> Option<usize> {
    match ast.call_args("&") {
        Some([Ast::Integer(n)]) if (1..=MAX_CAPTURE_PLACEHOLDER).contains(n) => {
            usize::try_from(*n).ok()
        }
        _ => None,
    }
}

fn collect(ast: &Ast, found: &mut FxHashMap<usize, CapturePlaceholder>) {
    if let Some(position) = placeholder_position(ast) {
        let entry = found.entry(position).or_insert_with(|| CapturePlaceholder {
            position,
            usage_count: 0,
            locations: Vec::new(),
        });
        entry.usage_count += 1;
        entry.locations.extend(ast.location());
        return;
    }

    match ast {
        Ast::List(items) => items.iter().for_each(|item| collect(item, found)),
        Ast::Pair(left, right) => {
            collect(left, found);
            collect(right, found);
        }
        Ast::Form(form) => {
            if ast.call_args("&").is_some() {
                return;
            }
            collect(&form.head, found);
            if let Args::List(args) = &form.args {
                args.iter().for_each(|arg| collect(arg, found));
            }
        }
        _ => {}
    }
}
