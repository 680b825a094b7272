//! # genokit
//!
//! Small, self-describing actions over the text formats that glue genomics
//! pipelines together.
//!
//! Each format gets a parser returning typed records and a `ParseError`,
//! and a CLI module exposing its actions as `genokit <module> <action>`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use genokit::formats::blast::{best_hits, read_blast};
//!
//! let hits = read_blast(Path::new("hits.blast")).unwrap();
//! for hit in best_hits(&hits, 1, false, false) {
//!     println!("{}\t{}\t{}", hit.query, hit.subject, hit.score);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`formats`]: Parsers and operations for FASTA, sizes, AGP, BED, BLAST,
//!   btab, NUCMER coords, GFF and SAM
//! - [`core`]: Interval arithmetic and summary statistics
//! - [`utils`]: Text formatting and file I/O helpers
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod formats;
pub mod utils;

pub use formats::ParseError;
