// crates/karaoke-core/src/helpers/mod.rs

pub mod time;
