// crates/karaoke-ui/src/modules/files.rs
//
// Input/output rows: ["Video Input"][path] and ["Audio output"][path].
//
// The text buffers live here rather than in PlayerState because modules only
// get read access to state. They follow state (dialog results, normalised
// recorder paths) whenever the field isn't being edited, and a typed edit is
// sent as a command when the field loses focus; Enter also drops focus.

use std::path::PathBuf;

use karaoke_core::state::PlayerState;
use karaoke_core::commands::PlayerCommand;
use super::KaraokeModule;
use egui::{TextEdit, Ui};

const BUTTON_W: f32 = 110.0;

#[derive(Default)]
pub struct FilesModule {
    input_text:  String,
    output_text: String,
}

impl FilesModule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KaraokeModule for FilesModule {
    fn name(&self) -> &str { "Files" }

    fn ui(&mut self, ui: &mut Ui, state: &PlayerState, cmd: &mut Vec<PlayerCommand>) {
        ui.horizontal(|ui| {
            let pick = egui::Button::new("Video Input").min_size(egui::vec2(BUTTON_W, 0.0));
            if ui.add(pick).clicked() {
                cmd.push(PlayerCommand::SelectInputFile);
            }
            if let Some(path) = path_field(ui, &mut self.input_text, &state.input_text, "input_path") {
                cmd.push(PlayerCommand::SetInputPath(path));
            }
        });

        ui.horizontal(|ui| {
            let pick = egui::Button::new("Audio output").min_size(egui::vec2(BUTTON_W, 0.0));
            if ui.add(pick).clicked() {
                cmd.push(PlayerCommand::SelectOutputFile);
            }
            if let Some(path) = path_field(ui, &mut self.output_text, &state.output_text, "output_path") {
                cmd.push(PlayerCommand::SetOutputPath(path));
            }
        });
    }
}

/// One full-width path field. Returns a path when an edit is committed.
fn path_field(ui: &mut Ui, buf: &mut String, current: &str, id: &str) -> Option<PathBuf> {
    let edit_id = ui.make_persistent_id(id);
    if !ui.memory(|m| m.has_focus(edit_id)) && buf.as_str() != current {
        *buf = current.to_owned();
    }
    let resp = ui.add(
        TextEdit::singleline(buf)
            .id(edit_id)
            .desired_width(f32::INFINITY),
    );
    if resp.lost_focus() {
        committed_path(buf, current)
    } else {
        None
    }
}

/// The path a committed edit should apply, if any. Blank and unchanged
/// text is ignored.
fn committed_path(text: &str, current: &str) -> Option<PathBuf> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == current {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_text_is_not_reapplied() {
        assert_eq!(committed_path("/v/song.mp4", "/v/song.mp4"), None);
    }

    #[test]
    fn blank_text_is_ignored() {
        assert_eq!(committed_path("   ", "/v/song.mp4"), None);
        assert_eq!(committed_path("", ""), None);
    }

    #[test]
    fn edited_text_is_trimmed_into_a_path() {
        assert_eq!(
            committed_path("  /v/other.mkv ", "/v/song.mp4"),
            Some(PathBuf::from("/v/other.mkv")),
        );
    }
}
