// crates/karaoke-ui/src/helpers/mod.rs
pub mod log;
pub mod shortcuts;
