//! Weighted-ratio similarity scoring.
//!
//! Scores are on a 0-100 floating scale and combine an indel-based ratio with
//! partial (substring) and token-order-insensitive variants. Strings are
//! compared as sequences of Unicode scalar values, without preprocessing.

use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;

/// Length of the longest common subsequence of `a` and `b`.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0usize; inner.len() + 1];
    for &oc in outer {
        let mut diag = 0;
        for (j, &ic) in inner.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if oc == ic {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[inner.len()]
}

/// Insertions plus deletions needed to turn `a` into `b`.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_len(a, b)
}

fn norm_distance(dist: usize, lensum: usize) -> f64 {
    if lensum == 0 {
        100.0
    } else {
        100.0 - 100.0 * dist as f64 / lensum as f64
    }
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    norm_distance(indel_distance(a, b), a.len() + b.len())
}

/// Normalized indel similarity of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best alignment of `needle` against windows of `haystack`.
///
/// Windows whose boundary character never occurs in the needle cannot start
/// or end a better alignment and are skipped.
fn partial_ratio_impl(needle: &[char], haystack: &[char]) -> f64 {
    let len1 = needle.len();
    let len2 = haystack.len();
    let needle_chars: BTreeSet<char> = needle.iter().copied().collect();
    let mut best = 0.0f64;

    for i in 1..len1 {
        if !needle_chars.contains(&haystack[i - 1]) {
            continue;
        }
        let score = ratio_chars(needle, &haystack[..i]);
        if score > best {
            best = score;
            if best == 100.0 {
                return best;
            }
        }
    }

    for i in 0..len2.saturating_sub(len1) {
        if !needle_chars.contains(&haystack[i + len1 - 1]) {
            continue;
        }
        let score = ratio_chars(needle, &haystack[i..i + len1]);
        if score > best {
            best = score;
            if best == 100.0 {
                return best;
            }
        }
    }

    for i in len2.saturating_sub(len1)..len2 {
        if !needle_chars.contains(&haystack[i]) {
            continue;
        }
        let score = ratio_chars(needle, &haystack[i..]);
        if score > best {
            best = score;
            if best == 100.0 {
                return best;
            }
        }
    }

    best
}

fn partial_ratio_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut best = partial_ratio_impl(shorter, longer);
    if best != 100.0 && a.len() == b.len() {
        best = best.max(partial_ratio_impl(longer, shorter));
    }
    best
}

/// Best ratio of the shorter string against any same-length window of the longer.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    partial_ratio_chars(&a, &b)
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

fn joined_chars<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Vec<char> {
    tokens
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .collect()
}

/// Ratio after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let a = joined_chars(sorted_tokens(a));
    let b = joined_chars(sorted_tokens(b));
    ratio_chars(&a, &b)
}

/// Ratio comparing the shared token set against each side's remainder.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersect: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab_joined = joined_chars(diff_ab);
    let diff_ba_joined = joined_chars(diff_ba);
    let ab_len = diff_ab_joined.len();
    let ba_len = diff_ba_joined.len();
    let sect_len = joined_chars(intersect).len();
    let separator = usize::from(sect_len != 0);

    let sect_ab_len = sect_len + separator + ab_len;
    let sect_ba_len = sect_len + separator + ba_len;

    let dist = indel_distance(&diff_ab_joined, &diff_ba_joined);
    let result = norm_distance(dist, sect_ab_len + sect_ba_len);

    if sect_len == 0 {
        return result;
    }

    let sect_ab_ratio = norm_distance(separator + ab_len, sect_len + sect_ab_len);
    let sect_ba_ratio = norm_distance(separator + ba_len, sect_len + sect_ba_len);
    result.max(sect_ab_ratio).max(sect_ba_ratio)
}

fn token_ratio(a: &str, b: &str) -> f64 {
    token_set_ratio(a, b).max(token_sort_ratio(a, b))
}

/// Partial ratio over sorted tokens; any shared token scores 100.
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = sorted_tokens(a);
    let tokens_b = sorted_tokens(b);
    let set_a: BTreeSet<&str> = tokens_a.iter().copied().collect();
    let set_b: BTreeSet<&str> = tokens_b.iter().copied().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    if set_a.intersection(&set_b).next().is_some() {
        return 100.0;
    }

    let diff_ab: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let diff_ba: Vec<&str> = set_b.difference(&set_a).copied().collect();

    let result = partial_ratio_chars(
        &joined_chars(tokens_a.iter().copied()),
        &joined_chars(tokens_b.iter().copied()),
    );
    if tokens_a.len() == diff_ab.len() && tokens_b.len() == diff_ba.len() {
        return result;
    }
    result.max(partial_ratio_chars(
        &joined_chars(diff_ab),
        &joined_chars(diff_ba),
    ))
}

/// Weighted ratio: the best of the plain, partial and token based scores,
/// each scaled by how much it is trusted given the length disparity.
pub fn wratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0.0;
    }

    let (len1, len2) = (a_chars.len() as f64, b_chars.len() as f64);
    let len_ratio = if len1 > len2 { len1 / len2 } else { len2 / len1 };

    let end_ratio = ratio_chars(&a_chars, &b_chars);
    if len_ratio < 1.5 {
        return end_ratio.max(token_ratio(a, b) * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let end_ratio = end_ratio.max(partial_ratio_chars(&a_chars, &b_chars) * partial_scale);
    end_ratio.max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}
