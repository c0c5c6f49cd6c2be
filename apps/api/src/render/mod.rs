// LaTeX rendering: escaping, per-section fragments and template assembly.
// Everything here is pure and synchronous; I/O lives in `resumes` and `typeset`.

pub mod assembler;
pub mod escape;
pub mod sections;
pub mod template;

pub use assembler::{render_resume, RenderOptions};
pub use template::Template;
