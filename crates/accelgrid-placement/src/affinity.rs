//! Label-selector and taint evaluation.
//!
//! A small boolean-expression evaluator over `(key, operator, values)`
//! triples: requirements inside a term are ANDed, terms inside a node
//! selector are ORed.

use std::collections::HashMap;

use accel_core::{
    LabelRequirement, LabelSelector, NodeSelector, PreferredSchedulingTerm, SelectorOperator,
    SelectorTerm, Taint, TaintEffect, Toleration, TolerationOperator,
};

pub type Labels = HashMap<String, String>;

pub fn requirement_matches(req: &LabelRequirement, labels: &Labels) -> bool {
    let value = labels.get(&req.key);
    match req.operator {
        SelectorOperator::In => value.is_some_and(|v| req.values.contains(v)),
        SelectorOperator::NotIn => value.is_none_or(|v| !req.values.contains(v)),
        SelectorOperator::Exists => value.is_some(),
        SelectorOperator::DoesNotExist => value.is_none(),
    }
}

pub fn term_matches(term: &SelectorTerm, labels: &Labels) -> bool {
    term.match_expressions
        .iter()
        .all(|req| requirement_matches(req, labels))
}

/// An empty selector places no constraint.
pub fn node_selector_matches(selector: &NodeSelector, labels: &Labels) -> bool {
    selector.terms.is_empty() || selector.terms.iter().any(|term| term_matches(term, labels))
}

/// An empty selector matches everything.
pub fn label_selector_matches(selector: &LabelSelector, labels: &Labels) -> bool {
    exact_labels_match(&selector.match_labels, labels)
        && selector
            .match_expressions
            .iter()
            .all(|req| requirement_matches(req, labels))
}

pub fn exact_labels_match(required: &Labels, labels: &Labels) -> bool {
    required
        .iter()
        .all(|(k, v)| labels.get(k).is_some_and(|nv| nv == v))
}

pub fn tolerates(toleration: &Toleration, taint: &Taint) -> bool {
    if toleration.effect.is_some_and(|e| e != taint.effect) {
        return false;
    }
    if toleration.key.is_empty() {
        return toleration.operator == TolerationOperator::Exists;
    }
    if toleration.key != taint.key {
        return false;
    }
    match toleration.operator {
        TolerationOperator::Exists => true,
        TolerationOperator::Equal => toleration.value == taint.value,
    }
}

/// First hard taint (`NoSchedule` / `NoExecute`) that no toleration covers.
pub fn untolerated_taint<'a>(tolerations: &[Toleration], taints: &'a [Taint]) -> Option<&'a Taint> {
    taints
        .iter()
        .filter(|t| t.effect != TaintEffect::PreferNoSchedule)
        .find(|t| !tolerations.iter().any(|tol| tolerates(tol, t)))
}

/// Matched weight over total weight of the preferred terms, or `None`
/// when the workload has no usable preferences.
pub fn preferred_affinity_fraction(terms: &[PreferredSchedulingTerm], labels: &Labels) -> Option<f64> {
    let total: u32 = terms.iter().map(|t| t.weight.min(100)).sum();
    if total == 0 {
        return None;
    }
    let matched: u32 = terms
        .iter()
        .filter(|t| term_matches(&t.preference, labels))
        .map(|t| t.weight.min(100))
        .sum();
    Some(f64::from(matched) / f64::from(total))
}
