//! LCP array stage.
//!
//! Every algorithm writes KEY_LCP with `lcp[0] = 0` and `lcp[i]` the length
//! of the longest common prefix of the suffixes at `sa[i - 1]` and `sa[i]`.
//!
//! | Algorithm | Needs | Time |
//! |---|---|---|
//! | [`Kasai`](LcpAlgorithm::Kasai) | text, SA, ISA (built if missing) | O(n) |
//! | [`Phi`](LcpAlgorithm::Phi) | text, SA | O(n) |
//! | [`SemiExternalPhi`](LcpAlgorithm::SemiExternalPhi) | text, SA | O(nq), sampled every q = 64 |
//! | [`BwtBased`](LcpAlgorithm::BwtBased) | BWT | O(n) |
//! | [`Go`](LcpAlgorithm::Go) | text, SA, BWT | O(n²) worst case |
//! | [`GoPhi`](LcpAlgorithm::GoPhi) | text, SA, BWT | O(n) |

use super::isa::construct_isa;
use super::sa::{check_sa_len, checked_entry, compact_alphabet, sa_width};
use crate::bits;
use crate::cache::{self, AlphabetWidth, CacheConfig, CacheWriter, KEY_ISA, KEY_LCP, KEY_SA};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PLCP sampling distance of the semi-external PHI algorithm.
const PHI_SAMPLE: usize = 64;

/// Comparison cap of the first phase of the two-phase algorithms.
const GO_LIMIT: usize = 254;

const NONE: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LcpAlgorithm {
    #[serde(rename = "kasai")]
    Kasai,
    #[default]
    #[serde(rename = "phi")]
    Phi,
    #[serde(rename = "semi-phi")]
    SemiExternalPhi,
    #[serde(rename = "bwt")]
    BwtBased,
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "go-phi")]
    GoPhi,
}

impl LcpAlgorithm {
    pub const ALL: [LcpAlgorithm; 6] = [
        LcpAlgorithm::Kasai,
        LcpAlgorithm::Phi,
        LcpAlgorithm::SemiExternalPhi,
        LcpAlgorithm::BwtBased,
        LcpAlgorithm::Go,
        LcpAlgorithm::GoPhi,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LcpAlgorithm::Kasai => "kasai",
            LcpAlgorithm::Phi => "phi",
            LcpAlgorithm::SemiExternalPhi => "semi-phi",
            LcpAlgorithm::BwtBased => "bwt",
            LcpAlgorithm::Go => "go",
            LcpAlgorithm::GoPhi => "go-phi",
        }
    }

    /// True if the algorithm reads the BWT.
    pub fn needs_bwt(self) -> bool {
        matches!(
            self,
            LcpAlgorithm::BwtBased | LcpAlgorithm::Go | LcpAlgorithm::GoPhi
        )
    }

    /// True if the algorithm reads the text and the suffix array.
    pub fn needs_text(self) -> bool {
        self != LcpAlgorithm::BwtBased
    }
}

impl fmt::Display for LcpAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LcpAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        LcpAlgorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown LCP algorithm `{}` (expected kasai, phi, semi-phi, bwt, go or go-phi)",
                    s
                )
            })
    }
}

/// Build KEY_LCP with `algorithm`.
pub fn construct_lcp(
    config: &mut CacheConfig,
    alphabet: AlphabetWidth,
    algorithm: LcpAlgorithm,
) -> Result<()> {
    debug!("building LCP with `{}`", algorithm);
    match algorithm {
        LcpAlgorithm::Kasai => construct_lcp_kasai(config, alphabet),
        LcpAlgorithm::Phi => construct_lcp_phi(config, alphabet),
        LcpAlgorithm::SemiExternalPhi => construct_lcp_semi_extern_phi(config, alphabet),
        LcpAlgorithm::BwtBased => construct_lcp_bwt_based(config, alphabet),
        LcpAlgorithm::Go => construct_lcp_go(config, alphabet, false),
        LcpAlgorithm::GoPhi => construct_lcp_go(config, alphabet, true),
    }
}

/// Extend a match of length `l` between the suffixes at `a` and `b`.
#[inline]
fn extend_match(text: &IntVector, a: usize, b: usize, mut l: usize, cap: usize) -> usize {
    let n = text.len();
    while l < cap && a + l < n && b + l < n && text.get(a + l) == text.get(b + l) {
        l += 1;
    }
    l
}

/// Write in-memory LCP values bit-compressed to their maximum.
fn store_lcp_values(config: &mut CacheConfig, lcp: &[usize]) -> Result<()> {
    let max = lcp.iter().copied().max().unwrap_or(0);
    let mut writer = CacheWriter::create(KEY_LCP, bits::bit_len(max as u64).max(1), config)?;
    for &l in lcp {
        writer.push(l as u64)?;
    }
    writer.close(config)?;
    info!("lcp: {} entries, max {}", lcp.len(), max);
    Ok(())
}

/// PLCP in text order from an in-memory text and suffix array.
fn plcp_from_sa(text: &IntVector, sa: &[usize]) -> Vec<usize> {
    let n = sa.len();
    let mut phi = vec![NONE; n];
    for i in 1..n {
        phi[sa[i]] = sa[i - 1];
    }
    let mut plcp = vec![0usize; n];
    let mut l = 0usize;
    for i in 0..n {
        let j = phi[i];
        if j == NONE {
            l = 0;
            continue;
        }
        l = extend_match(text, i, j, l, usize::MAX);
        plcp[i] = l;
        l = l.saturating_sub(1);
    }
    plcp
}

fn lcp_from_plcp(sa: &[usize], plcp: &[usize]) -> Vec<usize> {
    sa.iter()
        .enumerate()
        .map(|(i, &p)| if i == 0 { 0 } else { plcp[p] })
        .collect()
}

/// Kasai et al.: LCP values computed in text order through the ISA.
pub fn construct_lcp_kasai(config: &mut CacheConfig, alphabet: AlphabetWidth) -> Result<()> {
    construct_isa(config)?;
    let text: IntVector = cache::load_from_cache(alphabet.text_key(), config)?;
    let sa: IntVector = cache::load_from_cache(KEY_SA, config)?;
    let isa: IntVector = cache::load_from_cache(KEY_ISA, config)?;
    let n = sa.len();
    check_sa_len(n, text.len())?;
    check_sa_len(isa.len(), n)?;
    for p in sa.iter().chain(isa.iter()) {
        checked_entry(p, n)?;
    }

    let mut lcp = vec![0usize; n];
    let mut l = 0usize;
    for i in 0..n {
        let r = isa.get(i) as usize;
        if r == 0 {
            l = 0;
            continue;
        }
        let j = sa.get(r - 1) as usize;
        l = extend_match(&text, i, j, l, usize::MAX);
        lcp[r] = l;
        l = l.saturating_sub(1);
    }
    store_lcp_values(config, &lcp)
}

/// PHI algorithm: PLCP over the permutation `phi[sa[i]] = sa[i - 1]`, then
/// one streaming pass over SA to restore suffix order.
pub fn construct_lcp_phi(config: &mut CacheConfig, alphabet: AlphabetWidth) -> Result<()> {
    let text: IntVector = cache::load_from_cache(alphabet.text_key(), config)?;
    let mut sa = cache::open_cache_reader(KEY_SA, config)?;
    let n = sa.len();
    check_sa_len(n, text.len())?;

    // phi[i] = suffix preceding i in SA order, n for the first suffix.
    let mut plcp = IntVector::new(n, 0, sa_width(n));
    {
        let _event = config.phase("phi");
        let mut prev = n;
        for p in sa.iter() {
            let p = checked_entry(p, n)?;
            plcp.set(p, prev as u64);
            prev = p;
        }
    }

    let mut max_l = 0usize;
    {
        let _event = config.phase("plcp");
        let mut l = 0usize;
        for i in 0..n {
            let j = plcp.get(i) as usize;
            if j == n {
                l = 0;
                plcp.set(i, 0);
                continue;
            }
            l = extend_match(&text, i, j, l, usize::MAX);
            // plcp[i] <= n - i, which fits the SA width.
            plcp.set(i, l as u64);
            max_l = max_l.max(l);
            l = l.saturating_sub(1);
        }
    }

    let mut writer = CacheWriter::create(KEY_LCP, bits::bit_len(max_l as u64).max(1), config)?;
    for (i, p) in sa.iter().enumerate() {
        let value = if i == 0 { 0 } else { plcp.get(p as usize) };
        writer.push(value)?;
    }
    writer.close(config)?;
    info!("lcp: {} entries, max {}", n, max_l);
    Ok(())
}

/// PHI with PLCP sampled every 64 positions. Each LCP value is recomputed
/// from the sample below it, bounding the scan to `q` extra comparisons.
pub fn construct_lcp_semi_extern_phi(
    config: &mut CacheConfig,
    alphabet: AlphabetWidth,
) -> Result<()> {
    let text: IntVector = cache::load_from_cache(alphabet.text_key(), config)?;
    let mut sa = cache::open_cache_reader(KEY_SA, config)?;
    let n = sa.len();
    check_sa_len(n, text.len())?;
    let samples = n.div_ceil(PHI_SAMPLE);

    let mut phi_samples = vec![NONE; samples];
    let mut prev = NONE;
    for p in sa.iter() {
        let p = checked_entry(p, n)?;
        if p % PHI_SAMPLE == 0 {
            phi_samples[p / PHI_SAMPLE] = prev;
        }
        prev = p;
    }

    let mut plcp_samples = vec![0usize; samples];
    let mut l = 0usize;
    for (k, &j) in phi_samples.iter().enumerate() {
        if j == NONE {
            l = 0;
            continue;
        }
        l = extend_match(&text, k * PHI_SAMPLE, j, l, usize::MAX);
        plcp_samples[k] = l;
        // plcp[i + q] >= plcp[i] - q
        l = l.saturating_sub(PHI_SAMPLE);
    }
    drop(phi_samples);

    let mut writer = CacheWriter::create(KEY_LCP, sa_width(n), config)?;
    let mut prev = NONE;
    let mut max_l = 0usize;
    for p in sa.iter() {
        let p = p as usize;
        let value = if prev == NONE {
            0
        } else {
            let lower = plcp_samples[p / PHI_SAMPLE].saturating_sub(p % PHI_SAMPLE);
            extend_match(&text, p, prev, lower, usize::MAX)
        };
        max_l = max_l.max(value);
        writer.push(value as u64)?;
        prev = p;
    }
    writer.close(config)?;
    info!("lcp (semi-external phi): {} entries, max {}", n, max_l);
    Ok(())
}

/// Recover text and SA from the BWT by LF-walking, then run PHI in memory.
pub fn construct_lcp_bwt_based(config: &mut CacheConfig, alphabet: AlphabetWidth) -> Result<()> {
    let bwt: IntVector = cache::load_from_cache(alphabet.bwt_key(), config)?;
    let (text, sa) = {
        let _event = config.phase("lf walk");
        invert_bwt(&bwt)?
    };
    drop(bwt);
    let plcp = plcp_from_sa(&text, &sa);
    store_lcp_values(config, &lcp_from_plcp(&sa, &plcp))
}

/// Text and suffix array of a BWT whose text ends with a unique 0.
pub fn invert_bwt(bwt: &IntVector) -> Result<(IntVector, Vec<usize>)> {
    let n = bwt.len();
    if n == 0 {
        return Ok((IntVector::with_width(bwt.width()), Vec::new()));
    }
    let sentinels = bwt.iter().filter(|&c| c == 0).count();
    if sentinels != 1 {
        return Err(Error::Precondition(format!(
            "bwt contains {} sentinel symbols, expected exactly one",
            sentinels
        )));
    }
    let (ranks, sigma) = compact_alphabet(&bwt.to_vec());
    let mut counts = vec![0usize; sigma + 1];
    for &c in &ranks {
        counts[c + 1] += 1;
    }
    for c in 1..=sigma {
        counts[c] += counts[c - 1];
    }
    let mut lf = vec![0usize; n];
    for (i, &c) in ranks.iter().enumerate() {
        lf[i] = counts[c];
        counts[c] += 1;
    }

    let mut text = IntVector::new(n, 0, bwt.width());
    let mut sa = vec![0usize; n];
    sa[0] = n - 1;
    let mut row = 0usize;
    for k in (0..n - 1).rev() {
        text.set(k, bwt.get(row));
        row = lf[row];
        sa[row] = k;
    }
    Ok((text, sa))
}

/// Two-phase LCP. Phase one compares neighbouring suffixes up to 254
/// symbols; phase two resolves the rest by direct comparison (`Go`) or by
/// a PHI pass (`GoPhi`).
pub fn construct_lcp_go(
    config: &mut CacheConfig,
    alphabet: AlphabetWidth,
    phi_second_phase: bool,
) -> Result<()> {
    let bwt_len = cache::open_cache_reader(alphabet.bwt_key(), config)?.len();
    let text: IntVector = cache::load_from_cache(alphabet.text_key(), config)?;
    let sa: IntVector = cache::load_from_cache(KEY_SA, config)?;
    let n = sa.len();
    check_sa_len(n, text.len())?;
    let sa = sa
        .iter()
        .map(|p| checked_entry(p, n))
        .collect::<Result<Vec<usize>>>()?;
    if bwt_len != n {
        return Err(Error::Format(format!(
            "bwt has {} symbols but the suffix array has {} entries",
            bwt_len, n
        )));
    }

    let mut lcp = vec![0usize; n];
    let mut unresolved = Vec::new();
    {
        let _event = config.phase("go phase 1");
        for i in 1..n {
            let l = extend_match(&text, sa[i - 1], sa[i], 0, GO_LIMIT);
            lcp[i] = l;
            if l == GO_LIMIT {
                unresolved.push(i);
            }
        }
    }
    debug!("{} of {} entries reach the phase one cap", unresolved.len(), n);

    if !unresolved.is_empty() {
        let _event = config.phase("go phase 2");
        if phi_second_phase {
            let plcp = plcp_from_sa(&text, &sa);
            for &i in &unresolved {
                lcp[i] = plcp[sa[i]];
            }
        } else {
            for &i in &unresolved {
                lcp[i] = extend_match(&text, sa[i - 1], sa[i], GO_LIMIT, usize::MAX);
            }
        }
    }
    store_lcp_values(config, &lcp)
}
