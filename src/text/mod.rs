//! Text processing for content comparison
//!
//! This module provides:
//! - Canonicalization of extracted text so logically identical documents
//!   compare equal regardless of extraction order
//! - A bounded token-level diff for documents whose text changed

pub mod diff;
pub mod normalize;

pub use diff::{diff_tokens, TokenDiff, NO_DIFFERENCE};
pub use normalize::normalize;
