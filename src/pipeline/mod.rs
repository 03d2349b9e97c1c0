//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the two external engines can be swapped without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ text ──▶ images ──▶ markdown
//! (path)   (pdfium)  (pdfcpu)   (assembly)
//! ```
//!
//! 1. [`input`]    — validate the PDF path and make it absolute
//! 2. [`text`]     — plain text of every page, line endings normalised
//! 3. [`images`]   — run the image tool, then list the assets directory
//! 4. [`markdown`] — text, separator, numbered image references

pub mod images;
pub mod input;
pub mod markdown;
pub mod text;
