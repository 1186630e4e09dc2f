// crates/karaoke-ui/src/modules/menu.rs
//
// Menu bar: File → Exit, View → Fullscreen, Tools → Bind Play/Rec.
// The keyboard chords are consumed in app.rs; the menu only shows them.

use karaoke_core::state::PlayerState;
use karaoke_core::commands::PlayerCommand;
use crate::helpers::shortcuts;
use super::KaraokeModule;
use egui::Ui;

pub struct MenuModule;

impl KaraokeModule for MenuModule {
    fn name(&self) -> &str { "Menu" }

    fn ui(&mut self, ui: &mut Ui, state: &PlayerState, cmd: &mut Vec<PlayerCommand>) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                let exit = egui::Button::new("Exit")
                    .shortcut_text(ui.ctx().format_shortcut(&shortcuts::EXIT));
                if ui.add(exit).on_hover_text("Exit application").clicked() {
                    cmd.push(PlayerCommand::Exit);
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                let fullscreen = egui::Button::new("Fullscreen")
                    .selected(state.video_fullscreen)
                    .shortcut_text(ui.ctx().format_shortcut(&shortcuts::FULLSCREEN));
                if ui.add(fullscreen).on_hover_text("Toggle fullscreen mode").clicked() {
                    cmd.push(PlayerCommand::ToggleFullscreen);
                    ui.close_menu();
                }
            });

            ui.menu_button("Tools", |ui| {
                let mut bound = state.bind_play_rec;
                if ui.checkbox(&mut bound, "Bind Play/Rec")
                    .on_hover_text("Bind Play and Rec")
                    .clicked()
                {
                    cmd.push(PlayerCommand::ToggleBindPlayRec);
                    ui.close_menu();
                }
            });
        });
    }
}
