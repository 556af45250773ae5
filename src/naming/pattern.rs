//! Matching-regex synthesis.
//!
//! A convention's matching regex is assembled from one fragment per token. In
//! lenient mode tokens become optional from right to left, so for
//! `[descriptor, side, usage]` the regex accepts `arm`, `arm_l` and `arm_l_jnt`
//! but never an empty interior slot. Strict mode requires every token.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::rules::Rule;

/// Flags selecting a matching-regex shape. Used as the regex cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegexOptions {
    /// Wrap each token in a named capture group
    pub capture_groups: bool,
    /// Anchor with `^` and `$`
    pub full_match: bool,
    /// Require every token instead of allowing right-to-left omission
    pub strict: bool,
}

impl RegexOptions {
    /// Build options from the three flags.
    pub const fn new(capture_groups: bool, full_match: bool, strict: bool) -> Self {
        Self {
            capture_groups,
            full_match,
            strict,
        }
    }

    /// Anchored, capturing, tokens optional right-to-left. Used for extraction.
    pub const fn extraction() -> Self {
        Self::new(true, true, false)
    }

    /// Anchored, non-capturing, every token required. Used for validation.
    pub const fn complete() -> Self {
        Self::new(false, true, true)
    }
}

/// Default implementation for [`RegexOptions`]: anchored and lenient, no captures.
impl Default for RegexOptions {
    fn default() -> Self {
        Self::new(false, true, false)
    }
}

/// Assemble the matching regex for `tokens`.
pub fn synthesize(
    tokens: &[String],
    rules: &IndexMap<String, Rule>,
    separator: &str,
    options: RegexOptions,
) -> String {
    if tokens.is_empty() {
        return if options.full_match {
            "^$".to_string()
        } else {
            String::new()
        };
    }

    let last = tokens.len() - 1;
    let groups: Vec<String> = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let raw = rules.get(token).map_or_else(
                || catch_all_fragment(separator, tokens.len(), index == last, options),
                |rule| rule.to_regex_fragment(),
            );
            if options.capture_groups {
                format!("(?P<{token}>{raw})")
            } else {
                format!("(?:{raw})")
            }
        })
        .collect();

    let sep = regex::escape(separator);
    let body = if options.strict {
        groups.join(&sep)
    } else {
        lenient_body(&groups, &sep)
    };

    if options.full_match {
        format!("^{body}$")
    } else {
        body
    }
}

fn lenient_body(groups: &[String], sep: &str) -> String {
    let (first, rest) = match groups.split_first() {
        Some(split) => split,
        None => return String::new(),
    };
    let Some((last, middle)) = rest.split_last() else {
        return first.clone();
    };

    let mut suffix = format!("(?:{sep}{last})?");
    for group in middle.iter().rev() {
        suffix = format!("(?:{sep}{group}{suffix})?");
    }
    format!("{first}{suffix}")
}

/// Fragment for tokens without a rule: a non-empty value that stops where the
/// next separator starts.
///
/// With a single token there is nothing to separate, so anything goes. A
/// multi-character separator needs care before another token: the value must
/// not end in a prefix of the separator that would overlap it (with `__`,
/// `arm___l` splits as `arm` and `_l`). In lenient anchored mode a non-final
/// token may still be the end of the name, where only the separator itself is
/// excluded.
pub fn catch_all_fragment(
    separator: &str,
    token_count: usize,
    is_last: bool,
    options: RegexOptions,
) -> String {
    if token_count == 1 {
        return ".+".to_string();
    }
    let mut chars = separator.chars();
    match (chars.next(), chars.next()) {
        (Some(only), None) => format!("[^{}]+", escape_char(only)),
        (None, _) => ".+".to_string(),
        _ if is_last => format!("(?:{})", excluding_fragment(separator)),
        _ if options.strict => format!("(?:{})", before_separator_fragment(separator)),
        _ => format!(
            "(?:{}|{}{})",
            before_separator_fragment(separator),
            excluding_fragment(separator),
            if options.full_match { "$" } else { "" }
        ),
    }
}

/// Regex for the non-empty strings that do not contain `separator`.
///
/// Built without look-around: the strings avoiding `separator` are exactly the
/// ones accepted by its prefix (KMP) automaton with the full-match state
/// removed, and the regex is solved out of that automaton by state elimination.
pub fn excluding_fragment(separator: &str) -> String {
    separator_automaton_fragment(separator, false)
}

/// Regex for the non-empty strings `w` such that the first occurrence of
/// `separator` in `w` followed by `separator` starts right after `w`.
///
/// These are the values a "not the separator" repetition can take when a
/// separator follows.
pub fn before_separator_fragment(separator: &str) -> String {
    separator_automaton_fragment(separator, true)
}

fn separator_automaton_fragment(separator: &str, followed_by_separator: bool) -> String {
    let pattern: Vec<char> = separator.chars().collect();
    let n = pattern.len();
    if n == 0 {
        return ".+".to_string();
    }

    let mut classes: Vec<char> = Vec::new();
    for &c in &pattern {
        if !classes.contains(&c) {
            classes.push(c);
        }
    }
    let other = format!(
        "[^{}]",
        classes.iter().map(|&c| escape_char(c)).collect::<String>()
    );

    let failure = failure_function(&pattern);
    let step = |state: usize, symbol: Option<char>| -> usize {
        let mut q = state;
        loop {
            if symbol == Some(pattern[q]) {
                return q + 1;
            }
            if q == 0 {
                return 0;
            }
            q = failure[q - 1];
        }
    };

    // Symbols: each distinct separator char, plus `None` for every other char.
    let symbols: Vec<(Option<char>, String)> = std::iter::once((None, other))
        .chain(classes.iter().map(|&c| (Some(c), escape_char(c))))
        .collect();

    // Accepting states: feeding the separator from here must not complete an
    // earlier occurrence of it.
    let accepting = |state: usize| -> bool {
        if !followed_by_separator {
            return true;
        }
        let mut q = state;
        for &c in &pattern[..n - 1] {
            q = step(q, Some(c));
            if q == n {
                return false;
            }
        }
        true
    };

    let mut equations: Vec<Linear> = (0..n)
        .map(|q| {
            let mut eq = Linear::constant(accepting(q).then_some(Term::Empty));
            for (symbol, text) in &symbols {
                let target = step(q, *symbol);
                if target < n {
                    eq.add_coeff(target, Term::Expr(text.clone()));
                }
            }
            eq
        })
        .collect();

    for q in (0..n).rev() {
        if let Some(loop_term) = equations[q].coeffs.remove(&q) {
            equations[q] = equations[q].prefixed(&loop_term.star());
        }
        let resolved = equations[q].clone();
        for eq in equations.iter_mut().take(q) {
            if let Some(coeff) = eq.coeffs.remove(&q) {
                eq.merge(resolved.prefixed(&coeff));
            }
        }
    }

    let mut closed: Vec<Option<Term>> = Vec::with_capacity(n);
    for eq in &equations {
        let mut value = eq.constant.clone();
        for (var, coeff) in &eq.coeffs {
            let substituted = closed[*var].as_ref().map(|term| coeff.concat(term));
            value = alt(value, substituted);
        }
        closed.push(value);
    }

    let mut start: Option<Term> = None;
    for (symbol, text) in &symbols {
        let target = step(0, *symbol);
        if target < n {
            let tail = closed[target].as_ref().map(|t| Term::Expr(text.clone()).concat(t));
            start = alt(start, tail);
        }
    }

    match start {
        Some(Term::Expr(expr)) => expr,
        _ => ".+".to_string(),
    }
}

fn failure_function(pattern: &[char]) -> Vec<usize> {
    let mut failure = vec![0; pattern.len()];
    let mut k = 0;
    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = failure[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        failure[i] = k;
    }
    failure
}

fn escape_char(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}

/// A regex term that is either the empty string or a non-empty expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Empty,
    Expr(String),
}

impl Term {
    fn concat(&self, other: &Term) -> Term {
        match (self, other) {
            (Term::Empty, t) | (t, Term::Empty) => t.clone(),
            (Term::Expr(a), Term::Expr(b)) => Term::Expr(format!("{a}{b}")),
        }
    }

    fn star(&self) -> Term {
        match self {
            Term::Empty => Term::Empty,
            Term::Expr(x) => Term::Expr(format!("(?:{x})*")),
        }
    }
}

/// Alternation where `None` is the empty language.
fn alt(a: Option<Term>, b: Option<Term>) -> Option<Term> {
    match (a, b) {
        (None, t) | (t, None) => t,
        (Some(a), Some(b)) if a == b => Some(a),
        (Some(Term::Empty), Some(Term::Expr(x))) | (Some(Term::Expr(x)), Some(Term::Empty)) => {
            Some(Term::Expr(format!("(?:{x})?")))
        }
        (Some(Term::Expr(a)), Some(Term::Expr(b))) => Some(Term::Expr(format!("(?:{a}|{b})"))),
        (Some(Term::Empty), Some(Term::Empty)) => Some(Term::Empty),
    }
}

/// `constant | Σ coeff·X_var` over automaton states.
#[derive(Debug, Clone)]
struct Linear {
    constant: Option<Term>,
    coeffs: BTreeMap<usize, Term>,
}

impl Linear {
    fn constant(constant: Option<Term>) -> Self {
        Self {
            constant,
            coeffs: BTreeMap::new(),
        }
    }

    fn add_coeff(&mut self, var: usize, term: Term) {
        let merged = alt(self.coeffs.remove(&var), Some(term));
        if let Some(term) = merged {
            self.coeffs.insert(var, term);
        }
    }

    fn prefixed(&self, prefix: &Term) -> Linear {
        Linear {
            constant: self.constant.as_ref().map(|c| prefix.concat(c)),
            coeffs: self
                .coeffs
                .iter()
                .map(|(var, term)| (*var, prefix.concat(term)))
                .collect(),
        }
    }

    fn merge(&mut self, other: Linear) {
        self.constant = alt(self.constant.take(), other.constant);
        for (var, term) in other.coeffs {
            self.add_coeff(var, term);
        }
    }
}
