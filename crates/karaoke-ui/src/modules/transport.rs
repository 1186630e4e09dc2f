// crates/karaoke-ui/src/modules/transport.rs
//
// Transport row ([Play] [Stop] [Rec]  Volume ───●──) and the seek row
// under it.

use karaoke_core::state::PlayerState;
use karaoke_core::commands::PlayerCommand;
use karaoke_core::helpers::time::format_progress;
use crate::theme::{REC_ACTIVE, DARK_TEXT_DIM};
use super::KaraokeModule;
use egui::{Button, RichText, Slider, Ui};

pub struct TransportModule;

impl KaraokeModule for TransportModule {
    fn name(&self) -> &str { "Transport" }

    fn ui(&mut self, ui: &mut Ui, state: &PlayerState, cmd: &mut Vec<PlayerCommand>) {
        ui.horizontal(|ui| {
            let play = Button::new(state.playback.play_button_label()).min_size(egui::vec2(72.0, 0.0));
            if ui.add_enabled(state.can_play(), play).clicked() {
                cmd.push(PlayerCommand::PlayClicked);
            }
            if ui.add_enabled(state.playback.stop_enabled(), Button::new("Stop")).clicked() {
                cmd.push(PlayerCommand::Stop);
            }

            // Checkable: the new checked state rides along with the command.
            let rec_text = if state.recording {
                RichText::new("● Rec").color(egui::Color32::WHITE)
            } else {
                RichText::new("Rec")
            };
            let mut rec = Button::new(rec_text).selected(state.recording);
            if state.recording {
                rec = rec.fill(REC_ACTIVE);
            }
            if ui.add(rec).clicked() {
                cmd.push(PlayerCommand::RecordToggled(!state.recording));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut volume = state.volume;
                let slider = Slider::new(&mut volume, 0..=100).show_value(false);
                if ui.add(slider).changed() {
                    cmd.push(PlayerCommand::SetVolume(volume));
                }
                ui.label("Volume");
            });
        });

        ui.horizontal(|ui| {
            let label = format_progress(state.position, state.duration);
            let label_w = 110.0;
            ui.spacing_mut().slider_width = (ui.available_width() - label_w).max(40.0);

            let mut position = state.position;
            let seekable = state.duration > 0.0;
            let slider = Slider::new(&mut position, 0.0..=state.duration.max(0.0))
                .show_value(false);
            if ui.add_enabled(seekable, slider).changed() {
                cmd.push(PlayerCommand::Seek(position));
            }
            ui.label(RichText::new(label).monospace().color(DARK_TEXT_DIM));
        });
    }
}
