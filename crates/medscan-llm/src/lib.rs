//! Remote language-model enhancement for medical record extraction.
//!
//! Sends OCR text to a text-generation endpoint, narrows the JSON it answers
//! with to the canonical field set, and falls back to the pattern extractor
//! from `medscan-core` whenever anything goes wrong.

pub mod client;
pub mod enhancer;
pub mod extraction;
pub mod prompts;

pub use client::*;
pub use enhancer::*;
pub use extraction::*;
pub use prompts::*;
