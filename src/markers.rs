//! Marker parsing and template expansion.
//!
//! This module turns a raw benchmark command line into:
//! - A `Template`: the original tokens with each marker replaced by a slot.
//! - One ordered `ValueSet` per marker, aligned with the slots.
//!
//! Three marker sigils are recognized on the first byte of a token:
//! - `$start,stop[,step]` : integer range, stop exclusive
//! - `%a,b,c`             : verbatim comma-separated list
//! - `@dir`               : paired model files discovered under `dir`

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models;

/// The ordered values one marker expands to.
pub type ValueSet = Vec<String>;

/// A configuration error in the sweep description itself. These are fatal
/// before any combination runs.
#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("range marker '${0}' needs one to three comma-separated integers")]
    RangeArity(String),
    #[error("range marker '${payload}': '{component}' is not an integer")]
    RangeParse { payload: String, component: String },
    #[error("range marker '${0}' has a zero step")]
    RangeZeroStep(String),
    #[error("model directory {} does not exist", .0.display())]
    ModelDirMissing(PathBuf),
}

/// One token of the command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Copied into every combination unchanged.
    Literal(String),
    /// Filled positionally from the current combination.
    Slot,
}

/// The command line with marker positions abstracted out.
///
/// Invariant: the number of `Slot` tokens equals the number of value sets
/// produced by the same `expand` call, in left-to-right order.
#[derive(Debug, Clone)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn slot_count(&self) -> usize {
        self.tokens.iter().filter(|t| **t == Token::Slot).count()
    }

    /// Fills the slots from `combo` (one value per slot, in order) and
    /// returns the concrete argument vector.
    pub fn substitute(&self, combo: &[String]) -> Vec<String> {
        debug_assert_eq!(combo.len(), self.slot_count());
        let mut next_slot = 0;
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Literal(text) => text.clone(),
                Token::Slot => {
                    let value = combo[next_slot].clone();
                    next_slot += 1;
                    value
                }
            })
            .collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match token {
                Token::Literal(text) => write!(f, "{}", text)?,
                Token::Slot => write!(f, "{{}}")?,
            }
        }
        Ok(())
    }
}

/// The result of classifying and expanding a raw argument list.
#[derive(Debug)]
pub struct Expansion {
    pub template: Template,
    pub value_sets: Vec<ValueSet>,
}

/// Classifies every token of the benchmark command line and expands the
/// markers. `program` becomes the template's first literal (the argument
/// vector handed to the routine keeps the conventional argv\[0\]).
///
/// Pure apart from the directory scan behind `@` markers.
pub fn expand(program: &str, tokens: &[String]) -> Result<Expansion, MarkerError> {
    let mut out = vec![Token::Literal(program.to_string())];
    let mut value_sets = Vec::new();

    for token in tokens {
        if let Some(payload) = token.strip_prefix('$') {
            value_sets.push(expand_range(payload)?);
            out.push(Token::Slot);
        } else if let Some(payload) = token.strip_prefix('%') {
            value_sets.push(payload.split(',').map(str::to_string).collect());
            out.push(Token::Slot);
        } else if let Some(payload) = token.strip_prefix('@') {
            let found = models::discover(Path::new(payload))?;
            println!("{} models found under {}", found.len(), payload);
            for model in &found {
                println!("  {}", model);
            }
            value_sets.push(found);
            out.push(Token::Slot);
        } else {
            out.push(Token::Literal(token.clone()));
        }
    }

    Ok(Expansion {
        template: Template { tokens: out },
        value_sets,
    })
}

/// Expands a `start,stop[,step]` payload into the integer sequence from
/// `start` to `stop` exclusive. One component means `0..stop`. A negative
/// step counts down; a zero step is rejected rather than looping forever.
///
/// The payload is tokenized and validated explicitly; it is never handed to
/// any kind of expression evaluation.
fn expand_range(payload: &str) -> Result<ValueSet, MarkerError> {
    let parts: Vec<&str> = payload.split(',').collect();
    if parts.len() > 3 {
        return Err(MarkerError::RangeArity(payload.to_string()));
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        let value: i64 = part.trim().parse().map_err(|_| MarkerError::RangeParse {
            payload: payload.to_string(),
            component: part.to_string(),
        })?;
        numbers.push(value);
    }

    let (start, stop, step) = match numbers.len() {
        1 => (0, numbers[0], 1),
        2 => (numbers[0], numbers[1], 1),
        3 => (numbers[0], numbers[1], numbers[2]),
        _ => return Err(MarkerError::RangeArity(payload.to_string())),
    };

    if step == 0 {
        return Err(MarkerError::RangeZeroStep(payload.to_string()));
    }

    let mut values = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        values.push(current.to_string());
        // An overflowing next value is past any representable stop, so the
        // sequence ends here.
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn range_with_step() {
        let exp = expand("bench", &args(&["$1,8,2"])).unwrap();
        assert_eq!(exp.value_sets, vec![args(&["1", "3", "5", "7"])]);
    }

    #[test]
    fn range_default_step() {
        let exp = expand("bench", &args(&["$2,5"])).unwrap();
        assert_eq!(exp.value_sets, vec![args(&["2", "3", "4"])]);
    }

    #[test]
    fn range_single_component_counts_from_zero() {
        let exp = expand("bench", &args(&["$3"])).unwrap();
        assert_eq!(exp.value_sets, vec![args(&["0", "1", "2"])]);
    }

    #[test]
    fn range_negative_step_counts_down() {
        let exp = expand("bench", &args(&["$8,1,-3"])).unwrap();
        assert_eq!(exp.value_sets, vec![args(&["8", "5", "2"])]);
    }

    #[test]
    fn range_can_be_empty() {
        let exp = expand("bench", &args(&["$5,5"])).unwrap();
        assert_eq!(exp.value_sets, vec![Vec::<String>::new()]);
    }

    #[test]
    fn range_near_i64_max_stays_finite() {
        let marker = format!("${},{},2", i64::MAX - 1, i64::MAX);
        let exp = expand("bench", &args(&[&marker])).unwrap();
        assert_eq!(exp.value_sets, vec![vec![(i64::MAX - 1).to_string()]]);
    }

    #[test]
    fn range_near_i64_min_stays_finite() {
        let marker = format!("${},{},-2", i64::MIN + 1, i64::MIN);
        let exp = expand("bench", &args(&[&marker])).unwrap();
        assert_eq!(exp.value_sets, vec![vec![(i64::MIN + 1).to_string()]]);
    }

    #[test]
    fn range_zero_step_is_rejected() {
        let err = expand("bench", &args(&["$1,8,0"])).unwrap_err();
        assert!(matches!(err, MarkerError::RangeZeroStep(_)));
    }

    #[test]
    fn range_non_integer_is_rejected() {
        let err = expand("bench", &args(&["$1,fast"])).unwrap_err();
        assert!(matches!(err, MarkerError::RangeParse { .. }));
    }

    #[test]
    fn range_too_many_components_is_rejected() {
        let err = expand("bench", &args(&["$1,8,2,4"])).unwrap_err();
        assert!(matches!(err, MarkerError::RangeArity(_)));
    }

    #[test]
    fn list_splits_verbatim() {
        let exp = expand("bench", &args(&["%CPU,GPU"])).unwrap();
        assert_eq!(exp.value_sets, vec![args(&["CPU", "GPU"])]);
    }

    #[test]
    fn list_keeps_numeric_looking_elements_as_text() {
        let exp = expand("bench", &args(&["%1,2,4,8"])).unwrap();
        assert_eq!(exp.value_sets, vec![args(&["1", "2", "4", "8"])]);
    }

    #[test]
    fn list_preserves_empty_elements() {
        let exp = expand("bench", &args(&["%a,,b"])).unwrap();
        assert_eq!(exp.value_sets, vec![args(&["a", "", "b"])]);
    }

    #[test]
    fn literals_pass_through_in_position() {
        let exp = expand("bench", &args(&["-m", "net.xml", "-d", "%CPU,GPU"])).unwrap();
        assert_eq!(exp.template.slot_count(), 1);
        assert_eq!(exp.template.to_string(), "bench -m net.xml -d {}");
        // Punctuation other than the three sigils is not a marker.
        let exp = expand("bench", &args(&["--flag", "#tag", "!x"])).unwrap();
        assert_eq!(exp.template.slot_count(), 0);
        assert!(exp.value_sets.is_empty());
    }

    #[test]
    fn substitute_fills_slots_in_order() {
        let exp = expand("bench", &args(&["-nthreads", "$1,4,2", "-d", "%CPU,GPU"])).unwrap();
        let argv = exp.template.substitute(&args(&["3", "GPU"]));
        assert_eq!(argv, args(&["bench", "-nthreads", "3", "-d", "GPU"]));
    }

    #[test]
    fn missing_model_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = format!("@{}", dir.path().join("no_such_dir").display());
        let err = expand("bench", &args(&[&bogus])).unwrap_err();
        assert!(matches!(err, MarkerError::ModelDirMissing(_)));
    }
}
