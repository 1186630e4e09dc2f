// crates/karaoke-core/src/lib.rs
//
// Pure player data shared by karaoke-media and karaoke-ui.
// No egui, no ffmpeg, no runtime handles. Just state, commands and the
// plain types that travel over the media channels.

pub mod commands;
pub mod config;
pub mod helpers;
pub mod media_types;
pub mod state;
