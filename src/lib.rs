//! # sdix - Succinct Data Structures and Index Construction
//!
//! sdix provides bit vectors with rank/select support, a sparse bit-vector
//! encoding and a cache-coordinated pipeline that derives suffix arrays,
//! Burrows-Wheeler transforms, inverse suffix arrays and LCP arrays from a
//! text.
//!
//! ## Architecture
//!
//! Modules in dependency order:
//!
//! - [`bits`] - Word-level kernels (popcount, in-word select, pattern maps)
//! - [`storage`] - Disk files and named RAM files behind one handle
//! - [`int_vector`] - Packed integer sequences, serialization, streaming buffers
//! - [`rank_select`] - Rank and select over bit vectors for four bit patterns
//! - [`sd_vector`] - Sparse bit vectors split into high and low parts
//! - [`cache`] - Artifact keys, cache configuration and registration
//! - [`construct`] - SA, BWT, ISA and LCP stages plus the category dispatcher
//! - [`index`] - Containers the dispatcher assembles from the cache
//!
//! ## Quick Start
//!
//! ```no_run
//! use sdix::construct::{construct_im, InputFormat};
//! use sdix::index::EnhancedSuffixArray;
//! use sdix::storage::Storage;
//!
//! let storage = Storage::new();
//! let esa: EnhancedSuffixArray =
//!     construct_im(&storage, b"banana", InputFormat::Bytes).unwrap();
//! assert_eq!(esa.csa().count_bytes(b"ana"), 2);
//! assert_eq!(esa.longest_repeat(), Some((1, 3)));
//! ```

pub mod bits;
pub mod cache;
pub mod construct;
pub mod error;
pub mod index;
pub mod int_vector;
pub mod output;
pub mod rank_select;
pub mod sd_vector;
pub mod storage;
pub mod utils;

pub use error::{Error, Result};
