//! Natural ordering of file names: digit runs compare numerically,
//! everything else case-insensitively.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Num(u128),
    Text(String),
}

/// Sort key for [`natural_cmp`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<Chunk>);

/// Builds the natural sort key of `s`.
pub fn natural_key(s: &str) -> NaturalKey {
    let mut chunks = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !text.is_empty() {
                chunks.push(Chunk::Text(std::mem::take(&mut text)));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                chunks.push(Chunk::Num(parse_run(&digits)));
                digits.clear();
            }
            text.extend(c.to_lowercase());
        }
    }
    if !text.is_empty() {
        chunks.push(Chunk::Text(text));
    }
    if !digits.is_empty() {
        chunks.push(Chunk::Num(parse_run(&digits)));
    }
    NaturalKey(chunks)
}

fn parse_run(digits: &str) -> u128 {
    digits.parse().unwrap_or(u128::MAX)
}

/// Compares two names in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

/// Stable natural sort of `items` by the name `key` returns.
pub fn sort_natural_by<T>(items: &mut [T], key: impl Fn(&T) -> &str) {
    items.sort_by_cached_key(|item| natural_key(key(item)));
}
