//! Suffix array construction with the Kärkkäinen-Sanders skew algorithm
//! (http://algo2.iti.kit.edu/sanders/papers/suffix.ps.gz). Builds the array
//! in O(n) by splitting positions into triples and radix-sorting them.

use std::cmp::Ordering;

#[inline(always)]
fn leq_pairs(a1: i32, a2: i32, b1: i32, b2: i32) -> bool {
    a1 < b1 || (a1 == b1 && a2 <= b2)
}

#[inline(always)]
fn leq_triples(a1: i32, a2: i32, a3: i32, b1: i32, b2: i32, b3: i32) -> bool {
    a1 < b1 || (a1 == b1 && leq_pairs(a2, a3, b2, b3))
}

/// Counting sort of `source` by `keys[source[i] + offset]`. `source` holds
/// text positions, `keys` the text itself; `alphabet_range` bounds the key
/// values.
fn radix_pass(source: &[i32], target: &mut [i32], keys: &[i32], offset: usize, alphabet_range: i32) {
    let mut counters = vec![0i32; alphabet_range as usize + 1];
    for &pos in source {
        counters[keys[pos as usize + offset] as usize] += 1;
    }
    let mut sum = 0;
    for counter in counters.iter_mut() {
        let count = *counter;
        *counter = sum;
        sum += count;
    }
    for &pos in source {
        let key = keys[pos as usize + offset] as usize;
        target[counters[key] as usize] = pos;
        counters[key] += 1;
    }
}

/// Core of the skew algorithm. `s` must be `n + 3` long with three trailing
/// zeroes, all values positive, and `n >= 2`.
fn build_suffix_array(s: &[i32], n: usize, alphabet_range: i32, sa: &mut [i32]) {
    let n0 = (n + 2) / 3;
    let n1 = (n + 1) / 3;
    let n2 = n / 3;
    let n02 = n0 + n2;
    let mut s12 = vec![0i32; n02 + 3];
    let mut sa12 = vec![0i32; n02 + 3];
    let mut s0 = vec![0i32; n0];
    let mut sa0 = vec![0i32; n0];

    // positions of mod 1 and mod 2 suffixes; "+ (n0 - n1)" adds a dummy
    // mod 1 suffix when n % 3 == 1
    let mut j = 0;
    for i in 0..n + (n0 - n1) {
        if i % 3 != 0 {
            s12[j] = i as i32;
            j += 1;
        }
    }

    // lsb radix sort the mod 1 and mod 2 triples
    radix_pass(&s12[..n02], &mut sa12[..n02], s, 2, alphabet_range);
    radix_pass(&sa12[..n02], &mut s12[..n02], s, 1, alphabet_range);
    radix_pass(&s12[..n02], &mut sa12[..n02], s, 0, alphabet_range);

    // lexicographic names of the triples
    let mut name = 0i32;
    let (mut c0, mut c1, mut c2) = (-1i32, -1i32, -1i32);
    for i in 0..n02 {
        let pos = sa12[i] as usize;
        if s[pos] != c0 || s[pos + 1] != c1 || s[pos + 2] != c2 {
            name += 1;
            c0 = s[pos];
            c1 = s[pos + 1];
            c2 = s[pos + 2];
        }
        if pos % 3 == 1 {
            s12[pos / 3] = name;
        } else {
            s12[pos / 3 + n0] = name;
        }
    }

    if (name as usize) < n02 {
        // names not yet unique, recurse
        build_suffix_array(&s12, n02, name, &mut sa12);
        for i in 0..n02 {
            s12[sa12[i] as usize] = i as i32 + 1;
        }
    } else {
        for i in 0..n02 {
            sa12[s12[i] as usize - 1] = i as i32;
        }
    }

    // stably sort the mod 0 suffixes by their first character
    let mut j = 0;
    for i in 0..n02 {
        if (sa12[i] as usize) < n0 {
            s0[j] = 3 * sa12[i];
            j += 1;
        }
    }
    radix_pass(&s0, &mut sa0, s, 0, alphabet_range);

    // merge the sorted mod 0 and mod 1/2 suffixes
    let get_12 = |t: usize| -> i32 {
        if (sa12[t] as usize) < n0 {
            sa12[t] * 3 + 1
        } else {
            (sa12[t] - n0 as i32) * 3 + 2
        }
    };
    let mut p = 0;
    let mut t = n0 - n1;
    let mut k = 0;
    while k < n {
        let i = get_12(t) as usize;
        let j = sa0[p] as usize;
        let smaller_12 = if (sa12[t] as usize) < n0 {
            leq_pairs(s[i], s12[sa12[t] as usize + n0], s[j], s12[j / 3])
        } else {
            leq_triples(
                s[i],
                s[i + 1],
                s12[sa12[t] as usize - n0 + 1],
                s[j],
                s[j + 1],
                s12[j / 3 + n0],
            )
        };
        if smaller_12 {
            sa[k] = i as i32;
            t += 1;
            if t == n02 {
                // only mod 0 suffixes left
                k += 1;
                while p < n0 {
                    sa[k] = sa0[p];
                    p += 1;
                    k += 1;
                }
                break;
            }
        } else {
            sa[k] = j as i32;
            p += 1;
            if p == n0 {
                // only mod 1/2 suffixes left
                k += 1;
                while t < n02 {
                    sa[k] = get_12(t);
                    t += 1;
                    k += 1;
                }
                break;
            }
        }
        k += 1;
    }
}

/// Builds the suffix array of `text`, one entry per byte position.
pub fn text_to_suffix_array(text: &[u8]) -> Vec<i32> {
    let n = text.len();
    if n < 2 {
        return if n == 1 { vec![0] } else { Vec::new() };
    }
    let mut int_text = Vec::with_capacity(n + 3);
    int_text.extend(text.iter().map(|&b| b as i32));
    int_text.extend_from_slice(&[0, 0, 0]);
    let mut sa = vec![0i32; n];
    build_suffix_array(&int_text, n, 256, &mut sa);
    sa
}

/// `strncmp`-style comparison of `pattern` against the suffix at `pos`.
#[inline(always)]
fn compare_at(pattern: &[u8], text: &[u8], pos: usize) -> Ordering {
    let suffix = &text[pos..];
    let common = pattern.len().min(suffix.len());
    match pattern[..common].cmp(&suffix[..common]) {
        Ordering::Equal if common < pattern.len() => Ordering::Greater,
        ordering => ordering,
    }
}

/// All positions where `pattern` occurs in `text`, via binary search over
/// the suffix array. Order of the returned positions follows the array, not
/// the text.
pub fn find_all(pattern: &[u8], text: &[u8], suffix_array: &[i32]) -> Vec<i32> {
    let start = suffix_array
        .partition_point(|&pos| compare_at(pattern, text, pos as usize) == Ordering::Greater);
    let matched = suffix_array[start..]
        .partition_point(|&pos| compare_at(pattern, text, pos as usize) == Ordering::Equal);
    suffix_array[start..start + matched].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(text: &[u8]) -> Vec<i32> {
        let mut sa: Vec<i32> = (0..text.len() as i32).collect();
        sa.sort_by_key(|&i| &text[i as usize..]);
        sa
    }

    #[test]
    fn matches_naive_construction() {
        for text in [
            &b"abracadabra"[..],
            b"mississippi",
            b".stol.stola.pila.",
            b"aaaaaaa",
            b"ab",
            b"ba",
        ] {
            assert_eq!(text_to_suffix_array(text), naive(text), "{:?}", text);
        }
    }

    #[test]
    fn trivial_sizes() {
        assert_eq!(text_to_suffix_array(b""), Vec::<i32>::new());
        assert_eq!(text_to_suffix_array(b"x"), vec![0]);
    }

    #[test]
    fn finds_all_occurrences() {
        let text = b".stol.stola.stol.";
        let sa = text_to_suffix_array(text);
        let mut hits = find_all(b".stol.", text, &sa);
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 11]);
        assert!(find_all(b".pila.", text, &sa).is_empty());
    }

    #[test]
    fn pattern_longer_than_suffix() {
        let text = b"abc";
        let sa = text_to_suffix_array(text);
        assert!(find_all(b"cd", text, &sa).is_empty());
        assert_eq!(find_all(b"c", text, &sa), vec![2]);
    }
}
