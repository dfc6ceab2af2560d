//! Shared utility code throughout the Pakket project.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub use byteorder;

pub mod binary;
pub mod bits;
pub mod hints;
pub mod text;
