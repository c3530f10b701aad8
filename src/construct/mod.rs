//! Cache-driven construction pipeline.
//!
//! An index is built by walking its prerequisites backwards through the
//! cache: each stage runs only if its artifact is not yet registered and
//! registers what it writes. Which stages run is decided by the index's
//! [`IndexCategory`]:
//!
//! - `Csa`: TEXT → SA → BWT → container
//! - `Lcp`: TEXT → SA → LCP → container
//! - `Cst`: CSA component (under `csa_<typehash>`) → LCP → container
//! - `Wt`: text parsed into a scratch file → container → scratch removed
//!
//! After a successful build with `delete_files` set, every cached file of the
//! run is removed.

pub mod bwt;
pub mod events;
pub mod isa;
pub mod lcp;
pub mod sa;
pub mod sais;
pub mod text;

pub use bwt::{construct_bwt, invert_with_sa};
pub use events::{LogSink, PhaseEvent, PhaseRecorder, PhaseSink};
pub use isa::construct_isa;
pub use lcp::{construct_lcp, invert_bwt, LcpAlgorithm};
pub use sa::construct_sa;
pub use text::{append_zero_symbol, contains_no_zero_symbol, load_vector_from_file, InputFormat};

use crate::cache::{
    self, csa_key, AlphabetWidth, CacheConfig, Persist, KEY_LCP, KEY_SA,
};
use crate::error::{Error, Result};
use crate::int_vector::{IntVector, IntVectorReader};
use crate::storage::Storage;
use log::{debug, info};
use std::fmt;

/// Construction strategy of an index type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexCategory {
    /// Suffix array like: needs TEXT, SA and BWT.
    Csa,
    /// Suffix tree like: needs a CSA component and LCP.
    Cst,
    /// Needs LCP only.
    Lcp,
    /// Built directly from the text.
    Wt,
}

/// An index the pipeline knows how to build.
pub trait CacheConstructible: Persist {
    const CATEGORY: IndexCategory;
    const ALPHABET: AlphabetWidth;

    /// Suffix array component built first for `Cst` indexes. Other
    /// categories ignore it.
    type Csa: CacheConstructible;

    /// Assemble the index from the artifacts registered in `config`.
    fn from_cache(config: &CacheConfig) -> Result<Self>;

    /// Build from a streamed text. Only `Wt` indexes are built this way.
    fn from_text(_text: &mut IntVectorReader) -> Result<Self> {
        Err(Error::Precondition(format!(
            "{} cannot be built from a text stream",
            std::any::type_name::<Self>()
        )))
    }
}

/// Lifecycle of one cached artifact within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Missing,
    Building,
    Cached,
}

impl fmt::Display for ArtifactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactState::Missing => "missing",
            ArtifactState::Building => "building",
            ArtifactState::Cached => "cached",
        };
        f.write_str(s)
    }
}

/// Current state of `key`; a file left by an earlier run with the same id
/// is registered and counts as cached.
pub fn artifact_state(key: &str, config: &mut CacheConfig) -> ArtifactState {
    if cache::register_cache_file(key, config) {
        ArtifactState::Cached
    } else {
        ArtifactState::Missing
    }
}

/// Run `build` unless `key` is already cached.
///
/// Returns the state `key` was in before the call. A build that returns
/// without registering `key` is a [`Error::MissingDependency`].
pub fn ensure<F>(key: &str, config: &mut CacheConfig, build: F) -> Result<ArtifactState>
where
    F: FnOnce(&mut CacheConfig) -> Result<()>,
{
    let before = artifact_state(key, config);
    if before == ArtifactState::Cached {
        debug!("`{}` is cached, skipping", key);
        return Ok(before);
    }
    debug!("`{}`: {} -> {}", key, before, ArtifactState::Building);
    build(config)?;
    if !cache::cache_file_exists(key, config) {
        return Err(Error::missing(key));
    }
    debug!("`{}`: {} -> {}", key, ArtifactState::Building, ArtifactState::Cached);
    Ok(before)
}

/// LCP algorithm used when the caller does not pick one.
pub fn default_lcp_algorithm(alphabet: AlphabetWidth) -> LcpAlgorithm {
    match alphabet {
        AlphabetWidth::Byte => LcpAlgorithm::SemiExternalPhi,
        AlphabetWidth::Integer => LcpAlgorithm::Phi,
    }
}

/// Build `T` from `file` with the default LCP algorithm.
pub fn construct<T: CacheConstructible>(
    file: &str,
    config: &mut CacheConfig,
    format: InputFormat,
) -> Result<T> {
    construct_with_lcp(file, config, format, default_lcp_algorithm(T::ALPHABET))
}

/// Build `T` from `file`, using `algorithm` if an LCP array is needed.
pub fn construct_with_lcp<T: CacheConstructible>(
    file: &str,
    config: &mut CacheConfig,
    format: InputFormat,
    algorithm: LcpAlgorithm,
) -> Result<T> {
    let index = match T::CATEGORY {
        IndexCategory::Wt => construct_from_text::<T>(file, config, format)?,
        IndexCategory::Csa => {
            build_csa_artifacts(file, config, format, T::ALPHABET)?;
            T::from_cache(config)?
        }
        IndexCategory::Lcp => {
            build_lcp_artifacts(file, config, format, T::ALPHABET, algorithm)?;
            T::from_cache(config)?
        }
        IndexCategory::Cst => {
            let key = csa_key::<T::Csa>();
            ensure(&key, config, |config| {
                let mut child = config.child();
                build_csa_artifacts(file, &mut child, format, <T::Csa>::ALPHABET)?;
                let csa = <T::Csa>::from_cache(&child)?;
                config.file_map.extend(child.file_map);
                let _event = config.phase("store csa");
                cache::store_to_cache(&csa, &key, config)
            })?;
            build_lcp_artifacts(file, config, format, T::ALPHABET, algorithm)?;
            T::from_cache(config)?
        }
    };

    if config.delete_files {
        let _event = config.phase("delete temporary files");
        cache::delete_all_files(config)?;
    }
    info!(
        "constructed {} from `{}`",
        std::any::type_name::<T>(),
        file
    );
    Ok(index)
}

/// Parse `file`, check it holds no 0 and cache it with the sentinel appended.
pub fn construct_text(
    file: &str,
    config: &mut CacheConfig,
    format: InputFormat,
    alphabet: AlphabetWidth,
) -> Result<()> {
    let mut text = {
        let _event = config.phase("parse input text");
        load_vector_from_file(config.storage(), file, format, alphabet)?
    };
    contains_no_zero_symbol(&text, file)?;
    append_zero_symbol(&mut text);
    let _event = config.phase("store text");
    cache::store_to_cache(&text, alphabet.text_key(), config)
}

fn build_csa_artifacts(
    file: &str,
    config: &mut CacheConfig,
    format: InputFormat,
    alphabet: AlphabetWidth,
) -> Result<()> {
    ensure(alphabet.text_key(), config, |c| {
        construct_text(file, c, format, alphabet)
    })?;
    ensure(KEY_SA, config, |c| construct_sa(c, alphabet))?;
    ensure(alphabet.bwt_key(), config, |c| construct_bwt(c, alphabet))?;
    Ok(())
}

fn build_lcp_artifacts(
    file: &str,
    config: &mut CacheConfig,
    format: InputFormat,
    alphabet: AlphabetWidth,
    algorithm: LcpAlgorithm,
) -> Result<()> {
    ensure(KEY_LCP, config, |c| {
        ensure(alphabet.text_key(), c, |c| {
            construct_text(file, c, format, alphabet)
        })?;
        ensure(KEY_SA, c, |c| construct_sa(c, alphabet))?;
        if algorithm.needs_bwt() {
            ensure(alphabet.bwt_key(), c, |c| construct_bwt(c, alphabet))?;
        }
        let _event = c.phase("lcp");
        construct_lcp(c, alphabet, algorithm)
    })?;
    Ok(())
}

fn construct_from_text<T: CacheConstructible>(
    file: &str,
    config: &mut CacheConfig,
    format: InputFormat,
) -> Result<T> {
    let storage = config.storage().clone();
    if format == InputFormat::Serialized {
        let mut text = IntVectorReader::with_buffer_size(&storage, file, config.buffer_size)?;
        let _event = config.phase("construct from text");
        return T::from_text(&mut text);
    }

    let tmp = cache::tmp_file_name(config);
    {
        let _event = config.phase("parse input text");
        load_vector_from_file(&storage, file, format, T::ALPHABET)?.store_to_file(&storage, &tmp)?;
    }
    let built = {
        let _event = config.phase("construct from text");
        IntVectorReader::with_buffer_size(&storage, &tmp, config.buffer_size)
            .and_then(|mut text| T::from_text(&mut text))
    };
    storage.remove(&tmp)?;
    built
}

/// Intermediate artifact that can be built on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Artifact {
    Text,
    Sa,
    Isa,
    Bwt,
    #[default]
    Lcp,
}

impl Artifact {
    pub fn key(self, alphabet: AlphabetWidth) -> &'static str {
        match self {
            Artifact::Text => alphabet.text_key(),
            Artifact::Sa => KEY_SA,
            Artifact::Isa => cache::KEY_ISA,
            Artifact::Bwt => alphabet.bwt_key(),
            Artifact::Lcp => KEY_LCP,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Artifact::Text => "text",
            Artifact::Sa => "sa",
            Artifact::Isa => "isa",
            Artifact::Bwt => "bwt",
            Artifact::Lcp => "lcp",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Artifact {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "text" => Ok(Artifact::Text),
            "sa" => Ok(Artifact::Sa),
            "isa" => Ok(Artifact::Isa),
            "bwt" => Ok(Artifact::Bwt),
            "lcp" => Ok(Artifact::Lcp),
            other => Err(format!(
                "unknown artifact `{}` (expected text, sa, isa, bwt or lcp)",
                other
            )),
        }
    }
}

/// Build `artifact` and its prerequisites into the cache of `config`.
///
/// Unlike [`construct`] this never deletes the run's files.
pub fn construct_artifact(
    file: &str,
    config: &mut CacheConfig,
    format: InputFormat,
    alphabet: AlphabetWidth,
    artifact: Artifact,
    algorithm: LcpAlgorithm,
) -> Result<ArtifactState> {
    let key = artifact.key(alphabet);
    let before = artifact_state(key, config);
    match artifact {
        Artifact::Text => {
            ensure(key, config, |c| construct_text(file, c, format, alphabet))?;
        }
        Artifact::Sa | Artifact::Bwt => {
            ensure(alphabet.text_key(), config, |c| {
                construct_text(file, c, format, alphabet)
            })?;
            ensure(KEY_SA, config, |c| construct_sa(c, alphabet))?;
            if artifact == Artifact::Bwt {
                ensure(key, config, |c| construct_bwt(c, alphabet))?;
            }
        }
        Artifact::Isa => {
            ensure(key, config, |c| {
                ensure(alphabet.text_key(), c, |c| {
                    construct_text(file, c, format, alphabet)
                })?;
                ensure(KEY_SA, c, |c| construct_sa(c, alphabet))?;
                construct_isa(c)
            })?;
        }
        Artifact::Lcp => build_lcp_artifacts(file, config, format, alphabet, algorithm)?,
    }
    Ok(before)
}

/// Build `T` from in-memory data through a scratch RAM file.
pub fn construct_im<T: CacheConstructible>(
    storage: &Storage,
    data: &[u8],
    format: InputFormat,
) -> Result<T> {
    let tmp = crate::storage::ram_file_name(&cache::next_run_id());
    storage.write_all(&tmp, data)?;
    let mut config = CacheConfig::in_ram(true).with_storage(storage.clone());
    let built = construct::<T>(&tmp, &mut config, format);
    storage.remove(&tmp)?;
    built
}

/// [`construct_im`] for a text already held as an integer vector.
pub fn construct_im_vector<T: CacheConstructible>(storage: &Storage, text: &IntVector) -> Result<T> {
    let mut bytes = Vec::with_capacity(text.bit_size() / 8 + 16);
    text.serialize(&mut bytes)?;
    construct_im(storage, &bytes, InputFormat::Serialized)
}
