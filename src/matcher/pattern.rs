use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Result, RouterError};

lazy_static! {
    static ref MORPH_CLASSES: HashMap<char, String> = morph_classes();
}

/// Builds the fixed morphology table: selector char to an end-anchored,
/// case-insensitive alternation of known word endings. Models Russian case
/// endings; `ъ` classes also admit the bare stem (empty ending).
fn morph_classes() -> HashMap<char, String> {
    let classes: &[(&[char], bool, &str)] = &[
        (&['а', 'a'], false, "а у ы е ой"),
        (&['А', 'A'], false, "а у ы е ой ам ах ами"),
        (&['я'], false, "я ю и ей"),
        (&['Я'], false, "я ю и ей ь ям ями ях"),
        (&['и'], false, "ия ий ие ию ии ией ием"),
        (&['И'], false, "ия ий ие ию ии ией ием иев иям иями иях"),
        (&['ъ'], true, "е а у ом"),
        (&['Ъ'], true, "е а у ом ы и ов ей ам ами ах"),
        (&['o'], false, "o е а у ом"),
        (&['O'], false, "o е а у ом ы и ов ей ам ами ах"),
        (&['ь', 'е', 'e'], false, "ь й е ё я ю ью и ем ём"),
        (&['Ь', 'Е', 'E'], false, "ь й е ё я ю ью и ем ём ей ев ёв ям ам ями ами ах ях"),
    ];
    let mut map = HashMap::new();
    for (selectors, bare_stem, endings) in classes {
        let mut alternation = String::from("(?i:");
        if *bare_stem {
            alternation.push('|');
        }
        alternation.push_str(&endings.split_whitespace().collect::<Vec<_>>().join("|"));
        alternation.push_str(")$");
        for &selector in *selectors {
            map.insert(selector, alternation.clone());
        }
    }
    map
}

/// A compiled matcher over a single word.
///
/// The expression language: matching is anchored to the start of the word
/// unless the expression begins with `*`; runs of lowercase letters match
/// case-insensitively while uppercase letters match exactly; `(...)` inserts
/// a raw regex sub-expression (the escape hatch for advanced patterns); a
/// trailing `$` anchors the end of the word, and `$` followed by one or two
/// characters instead expands the last of them into a morphological suffix
/// class (`ноч$ь` matches `ночью`).
#[derive(Debug, Clone)]
pub struct Pattern {
    re: Regex,
    expr: String,
}

impl Pattern {
    pub fn new(expr: &str) -> Result<Self> {
        if expr.is_empty() {
            return Ok(Self {
                re: Regex::new("")?,
                expr: String::new(),
            });
        }

        let mut out = String::with_capacity(expr.len() * 2);
        let mut rest = expr;
        if let Some(stripped) = rest.strip_prefix('*') {
            rest = stripped;
        } else {
            out.push('^');
        }

        let mut depth = 0usize;
        let mut folding = false; // inside a `(?i:` group opened for a lowercase run
        let mut dollar: Option<usize> = None;
        for (i, c) in rest.char_indices() {
            match c {
                '(' => {
                    depth += 1;
                    if folding {
                        out.push(')');
                        folding = false;
                    }
                    out.push_str("(?i:");
                }
                ')' => {
                    if depth == 0 {
                        return Err(syntax(expr, format!("unmatched `)` at {i}")));
                    }
                    depth -= 1;
                    out.push(')');
                }
                '*' => {
                    if depth == 0 {
                        return Err(syntax(
                            expr,
                            format!("`*` at {i} must be the first char or inside `()`"),
                        ));
                    }
                    out.push('*');
                }
                '$' => {
                    if depth > 0 {
                        return Err(syntax(expr, format!("`$` is not allowed inside `()` at {i}")));
                    }
                    dollar = Some(i);
                    break;
                }
                _ => {
                    if depth == 0 && c.is_alphabetic() {
                        let lower = c.is_lowercase();
                        if lower != folding {
                            if folding {
                                out.push(')');
                            } else {
                                out.push_str("(?i:");
                            }
                            folding = lower;
                        }
                    }
                    out.push(c);
                }
            }
        }
        if folding {
            out.push(')');
        }

        if let Some(pos) = dollar {
            let tail = &rest[pos + '$'.len_utf8()..];
            match (tail.chars().count(), tail.chars().last()) {
                (0, _) => out.push('$'),
                (1 | 2, Some(selector)) => match MORPH_CLASSES.get(&selector) {
                    Some(alternation) => out.push_str(alternation),
                    None => {
                        return Err(syntax(
                            expr,
                            format!("unknown morphology selector `{selector}` after `$`"),
                        ));
                    }
                },
                _ => {
                    return Err(syntax(
                        expr,
                        "`$` must be last, or followed by a one- or two-char morphology selector"
                            .into(),
                    ));
                }
            }
        }

        let re =
            Regex::new(&out).map_err(|e| RouterError::Pattern(format!("`{expr}`: {e}")))?;
        Ok(Self {
            re,
            expr: expr.to_string(),
        })
    }

    pub fn matches(&self, word: &str) -> bool {
        self.re.is_match(word)
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ==> {}", self.expr, self.re.as_str())
    }
}

fn syntax(expr: &str, reason: String) -> RouterError {
    RouterError::Pattern(format!("`{expr}`: {reason}"))
}
