//! Suffix sorting by induced sorting (SA-IS).
//!
//! Input texts end with a unique smallest symbol 0. Runs in O(n) time with
//! the recursion working on the reduced string of LMS substring names.

const EMPTY: usize = usize::MAX;

/// Suffix array of `text`, whose symbols are all below `sigma`.
///
/// Texts of length at most 2 are handled directly: `[0]` for `$` and
/// `[1, 0]` for `c$`.
pub fn suffix_array(text: &[usize], sigma: usize) -> Vec<usize> {
    match text.len() {
        0 => Vec::new(),
        1 => vec![0],
        2 => vec![1, 0],
        _ => sais(text, sigma.max(1)),
    }
}

fn bucket_counts(t: &[usize], sigma: usize) -> Vec<usize> {
    let mut counts = vec![0usize; sigma];
    for &c in t {
        counts[c] += 1;
    }
    counts
}

fn bucket_heads(counts: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    counts
        .iter()
        .map(|&c| {
            let head = sum;
            sum += c;
            head
        })
        .collect()
}

fn bucket_tails(counts: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    counts
        .iter()
        .map(|&c| {
            sum += c;
            sum
        })
        .collect()
}

/// `stype[i]`: suffix `i` is S-type (smaller than suffix `i + 1`).
fn classify(t: &[usize]) -> Vec<bool> {
    let n = t.len();
    let mut stype = vec![false; n];
    stype[n - 1] = true;
    for i in (0..n - 1).rev() {
        stype[i] = t[i] < t[i + 1] || (t[i] == t[i + 1] && stype[i + 1]);
    }
    stype
}

#[inline]
fn is_lms(stype: &[bool], i: usize) -> bool {
    i > 0 && stype[i] && !stype[i - 1]
}

fn induce(t: &[usize], sa: &mut [usize], stype: &[bool], counts: &[usize]) {
    let n = t.len();
    let mut heads = bucket_heads(counts);
    for i in 0..n {
        let j = sa[i];
        if j == EMPTY || j == 0 {
            continue;
        }
        let p = j - 1;
        if !stype[p] {
            sa[heads[t[p]]] = p;
            heads[t[p]] += 1;
        }
    }
    let mut tails = bucket_tails(counts);
    for i in (0..n).rev() {
        let j = sa[i];
        if j == EMPTY || j == 0 {
            continue;
        }
        let p = j - 1;
        if stype[p] {
            tails[t[p]] -= 1;
            sa[tails[t[p]]] = p;
        }
    }
}

fn lms_substrings_equal(t: &[usize], stype: &[bool], a: usize, b: usize) -> bool {
    let n = t.len();
    if a == n - 1 || b == n - 1 {
        return a == b;
    }
    let mut i = 0;
    loop {
        let (x, y) = (a + i, b + i);
        if t[x] != t[y] || stype[x] != stype[y] {
            return false;
        }
        if i > 0 {
            let (lx, ly) = (is_lms(stype, x), is_lms(stype, y));
            if lx || ly {
                return lx && ly;
            }
        }
        i += 1;
    }
}

fn sais(t: &[usize], sigma: usize) -> Vec<usize> {
    let n = t.len();
    let stype = classify(t);
    let counts = bucket_counts(t, sigma);
    let mut sa = vec![EMPTY; n];

    // Sort LMS substrings.
    let mut tails = bucket_tails(&counts);
    for i in 1..n {
        if is_lms(&stype, i) {
            tails[t[i]] -= 1;
            sa[tails[t[i]]] = i;
        }
    }
    induce(t, &mut sa, &stype, &counts);

    let mut m = 0;
    for i in 0..n {
        if sa[i] != EMPTY && is_lms(&stype, sa[i]) {
            sa[m] = sa[i];
            m += 1;
        }
    }

    // Name LMS substrings; names land at `m + pos / 2`.
    for slot in sa[m..].iter_mut() {
        *slot = EMPTY;
    }
    let mut names = 0;
    let mut prev = EMPTY;
    for i in 0..m {
        let pos = sa[i];
        if prev == EMPTY || !lms_substrings_equal(t, &stype, prev, pos) {
            names += 1;
            prev = pos;
        }
        sa[m + pos / 2] = names - 1;
    }
    let mut j = n;
    for i in (m..n).rev() {
        if sa[i] != EMPTY {
            j -= 1;
            sa[j] = sa[i];
        }
    }
    let reduced: Vec<usize> = sa[n - m..].to_vec();

    let reduced_sa = if names < m {
        sais(&reduced, names)
    } else {
        let mut direct = vec![0; m];
        for (i, &name) in reduced.iter().enumerate() {
            direct[name] = i;
        }
        direct
    };

    // Place LMS suffixes in sorted order, then induce the rest.
    let lms_positions: Vec<usize> = (1..n).filter(|&i| is_lms(&stype, i)).collect();
    sa.fill(EMPTY);
    let mut tails = bucket_tails(&counts);
    for i in (0..m).rev() {
        let p = lms_positions[reduced_sa[i]];
        tails[t[p]] -= 1;
        sa[tails[t[p]]] = p;
    }
    induce(t, &mut sa, &stype, &counts);
    sa
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(t: &[usize]) -> Vec<usize> {
        let mut sa: Vec<usize> = (0..t.len()).collect();
        sa.sort_by(|&a, &b| t[a..].cmp(&t[b..]));
        sa
    }

    fn with_sentinel(s: &[u8]) -> Vec<usize> {
        s.iter().map(|&b| b as usize).chain(std::iter::once(0)).collect()
    }

    #[test]
    fn test_banana() {
        let t = with_sentinel(b"banana");
        assert_eq!(suffix_array(&t, 256), vec![6, 5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn test_trivial_lengths() {
        assert_eq!(suffix_array(&[0], 1), vec![0]);
        assert_eq!(suffix_array(&[5, 0], 6), vec![1, 0]);
        assert!(suffix_array(&[], 1).is_empty());
    }

    #[test]
    fn test_matches_naive_sort() {
        let inputs: [&[u8]; 6] = [
            b"mississippi",
            b"aaaaaaaaaaaa",
            b"abababababab",
            b"abracadabra abracadabra",
            b"zyxwvutsrqponm",
            b"the quick brown fox jumps over the lazy dog the end",
        ];
        for s in inputs {
            let t = with_sentinel(s);
            assert_eq!(suffix_array(&t, 256), naive(&t), "{:?}", std::str::from_utf8(s));
        }
    }

    #[test]
    fn test_pseudo_random_small_alphabet() {
        let mut x = 12345u64;
        for len in [3usize, 10, 100, 1000] {
            let mut t: Vec<usize> = (0..len)
                .map(|_| {
                    x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    1 + (x >> 62) as usize
                })
                .collect();
            t.push(0);
            assert_eq!(suffix_array(&t, 5), naive(&t), "len {}", len);
        }
    }
}
