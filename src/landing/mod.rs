//! Landing-page copy assembly and rendering.

pub mod assembler;
pub mod copy;
pub mod renderer;

pub use assembler::{AssembledCopy, CopyAssembler, MAX_RETRY_SWEEPS};
pub use copy::{CopyDocument, SectionKey, SectionSet, REQUIRED_SECTIONS};
pub use renderer::render;
