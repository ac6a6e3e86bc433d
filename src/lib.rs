// Library API shared by the CLI and the WASM build
pub mod errors;
pub mod index;
pub mod lexicon;
pub mod log;
pub mod pattern;
pub mod preview;
pub mod session;
pub mod slot;
pub mod solver;
pub mod word_record;

mod cross_char;

// Compile the wasm glue only when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;
