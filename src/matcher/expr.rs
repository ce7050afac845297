use crate::types::{Result, RouterError};

use super::pattern::Pattern;
use super::tokenize::tokenize;

/// A sentence-matching condition in disjunctive normal form over word
/// patterns.
///
/// Grammar: `Expr := Disjunct {";" Disjunct}`,
/// `Disjunct := Seq {"&" Seq}`, `Seq := Token {" " Token}`.
/// `;` is OR, `&` is AND; a Seq matches a run of consecutive words.
#[derive(Debug, Clone)]
pub struct Expr {
    elems: Vec<ExprElem>,
    /// Required member count per conjunction group.
    conj_sizes: Vec<usize>,
}

#[derive(Debug, Clone)]
struct ExprElem {
    seq: Vec<Pattern>,
    /// Conjunction groups this sequence belongs to; empty means the sequence
    /// alone satisfies the whole expression.
    groups: Vec<usize>,
}

impl ExprElem {
    fn matches_prefix<S: AsRef<str>>(&self, window: &[S]) -> bool {
        if window.len() < self.seq.len() {
            return false;
        }
        self.seq
            .iter()
            .zip(window)
            .all(|(pattern, word)| pattern.matches(word.as_ref()))
    }
}

impl Expr {
    pub fn new(cond: &str) -> Result<Self> {
        let mut disjuncts = split_trimmed(cond, ';');
        if disjuncts.is_empty() {
            return Err(RouterError::Condition("empty filter condition".into()));
        }
        // Cheap rejections first; the ordering never changes the boolean
        // result, only short-circuit speed.
        disjuncts.sort_by_key(|d| (d.contains('&'), d.len()));

        let mut elems: Vec<ExprElem> = Vec::new();
        let mut seqs: Vec<Vec<String>> = Vec::new();
        let mut conj_sizes: Vec<usize> = Vec::new();

        for disjunct in &disjuncts {
            let members = split_trimmed(disjunct, '&');
            let is_conj = members.len() > 1;
            let group = conj_sizes.len();
            if is_conj {
                conj_sizes.push(members.len());
            }
            for member in &members {
                let tokens: Vec<String> =
                    member.split_whitespace().map(str::to_string).collect();
                match find_seq(&seqs, &tokens) {
                    SeqLookup::Overlap(idx) => {
                        return Err(RouterError::Condition(format!(
                            "pattern sequences `{}` and `{}` overlap (one is a prefix of the other), remove the redundant one",
                            member,
                            seqs[idx].join(" ")
                        )));
                    }
                    SeqLookup::Found(idx) => {
                        if !is_conj {
                            return Err(RouterError::Condition(format!(
                                "duplicate pattern sequence `{member}`"
                            )));
                        }
                        if elems[idx].groups.is_empty() {
                            return Err(RouterError::Condition(format!(
                                "`{member}` already matches as a standalone branch, the conjunction is redundant"
                            )));
                        }
                        if elems[idx].groups.contains(&group) {
                            return Err(RouterError::Condition(format!(
                                "`{member}` is repeated within one conjunction"
                            )));
                        }
                        elems[idx].groups.push(group);
                    }
                    SeqLookup::Missing => {
                        let seq = tokens
                            .iter()
                            .map(|token| Pattern::new(token))
                            .collect::<Result<Vec<_>>>()?;
                        elems.push(ExprElem {
                            seq,
                            groups: if is_conj { vec![group] } else { Vec::new() },
                        });
                        seqs.push(tokens);
                    }
                }
            }
        }
        Ok(Self { elems, conj_sizes })
    }

    /// Matches against an untokenized sentence.
    pub fn matches(&self, text: &str) -> bool {
        self.match_words(&tokenize(text))
    }

    /// Matches against a tokenized sentence. Stateless: all match progress is
    /// per-call scratch, so concurrent calls are safe.
    pub fn match_words<S: AsRef<str>>(&self, words: &[S]) -> bool {
        let mut remaining = self.conj_sizes.clone();
        let mut satisfied = vec![false; self.elems.len()];

        for start in 0..words.len() {
            let window = &words[start..];
            for (idx, elem) in self.elems.iter().enumerate() {
                if elem.groups.is_empty() {
                    if elem.matches_prefix(window) {
                        return true;
                    }
                } else {
                    if satisfied[idx] {
                        continue;
                    }
                    if elem.matches_prefix(window) {
                        satisfied[idx] = true;
                        for &group in &elem.groups {
                            remaining[group] -= 1;
                            if remaining[group] == 0 {
                                return true;
                            }
                        }
                    }
                }
            }
        }
        false
    }
}

enum SeqLookup {
    /// Identical sequence already registered at this index.
    Found(usize),
    /// One of the two sequences is a strict prefix of the other.
    Overlap(usize),
    Missing,
}

fn find_seq(seqs: &[Vec<String>], tokens: &[String]) -> SeqLookup {
    for (i, seq) in seqs.iter().enumerate() {
        if seq == tokens {
            return SeqLookup::Found(i);
        }
        let shared = seq.len().min(tokens.len());
        if seq[..shared] == tokens[..shared] {
            return SeqLookup::Overlap(i);
        }
    }
    SeqLookup::Missing
}

fn split_trimmed(s: &str, sep: char) -> Vec<&str> {
    s.split(sep)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}
