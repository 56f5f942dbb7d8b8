//! Domain models for pagecraft.
//!
//! # Core Concepts
//!
//! - [`Project`]: a directory under the workspace root. Its generated page
//!   (`index.html`), prompt ledger (`prompt.txt`) and preview image
//!   (`.thumbnail.png`) live inside it.
//! - [`ActiveSession`]: the single project targeted by generation.
//! - [`PromptRecord`]: append-only ledger line written after each successful
//!   generation.
//! - [`GenerationOutcome`]: transient result of one generation run.

mod generation;
mod history;
mod project;
mod session;

pub use generation::*;
pub use history::*;
pub use project::*;
pub use session::*;
