pub mod accountant;

pub use accountant::{apply_close, effective_limit};
