// crates/karaoke-media/src/helpers/mod.rs
//
// Internal helper modules for karaoke-media.
// Not re-exported from lib.rs; these are decode implementation details,
// not part of the public API consumed by karaoke-ui.

pub mod seek;
