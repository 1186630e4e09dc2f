// crates/karaoke-ui/src/modules/mod.rs
//
// Module registry. To add a new section of the window:
//   1. Create modules/mysection.rs implementing KaraokeModule
//   2. Add `pub mod mysection;` below
//   3. Add a field and one ui() call in app.rs

pub mod menu;
pub mod monitor;
pub mod transport;
pub mod files;
pub mod video_module;
pub mod audio_module;

use karaoke_core::state::PlayerState;
use karaoke_core::commands::PlayerCommand;
use egui::Ui;

/// Every section of the window implements this trait.
/// Modules read state, emit commands; they never mutate state directly.
pub trait KaraokeModule {
    fn name(&self) -> &str;
    fn ui(
        &mut self,
        ui:    &mut Ui,
        state: &PlayerState,
        cmd:   &mut Vec<PlayerCommand>,
    );
    /// Called every frame after commands are processed.
    /// Non-rendering modules (e.g. AudioModule) use this instead of ui().
    fn tick(&mut self, _state: &PlayerState, _ctx: &mut crate::context::AppContext) {}
}
