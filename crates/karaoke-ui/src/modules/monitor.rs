// crates/karaoke-ui/src/modules/monitor.rs
//
// The video surface. Paints the current frame letterboxed into whatever
// space is left, and turns a double-click into a fullscreen toggle.

use karaoke_core::state::PlayerState;
use karaoke_core::commands::PlayerCommand;
use crate::theme::{DARK_TEXT_DIM, MONITOR_BG};
use super::KaraokeModule;
use egui::{Rect, Sense, Ui, Vec2, pos2};

pub struct MonitorModule {
    /// Set by app.rs each frame from AppContext::frame.
    pub current_frame: Option<egui::TextureHandle>,
}

impl MonitorModule {
    pub fn new() -> Self {
        Self { current_frame: None }
    }
}

impl KaraokeModule for MonitorModule {
    fn name(&self) -> &str { "Monitor" }

    fn ui(&mut self, ui: &mut Ui, state: &PlayerState, cmd: &mut Vec<PlayerCommand>) {
        let (rect, resp) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, MONITOR_BG);

        match &self.current_frame {
            Some(tex) => {
                let size  = tex.size_vec2();
                let ratio = if size.y > 0.0 { size.x / size.y } else { state.video_ratio() };
                painter.image(
                    tex.id(),
                    fit_rect(rect, ratio),
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            None => {
                let hint = if state.input_path.is_none() {
                    "Choose a video with \"Video Input\""
                } else if state.video_size.is_none() && state.duration > 0.0 {
                    "No video track"
                } else {
                    ""
                };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    hint,
                    egui::FontId::proportional(14.0),
                    DARK_TEXT_DIM,
                );
            }
        }

        if resp.double_clicked() {
            cmd.push(PlayerCommand::ToggleFullscreen);
        }
    }
}

/// Largest rect with the given width/height `ratio` centered inside `outer`.
pub fn fit_rect(outer: Rect, ratio: f32) -> Rect {
    if !(ratio.is_finite() && ratio > 0.0) || outer.height() <= 0.0 {
        return outer;
    }
    let size = if outer.width() / outer.height() > ratio {
        Vec2::new(outer.height() * ratio, outer.height())
    } else {
        Vec2::new(outer.width(), outer.width() / ratio)
    };
    Rect::from_center_size(outer.center(), size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outer(w: f32, h: f32) -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), Vec2::new(w, h))
    }

    #[test]
    fn wide_video_in_tall_space_is_letterboxed() {
        let r = fit_rect(outer(800.0, 800.0), 16.0 / 9.0);
        assert_eq!(r.width(), 800.0);
        assert!((r.height() - 450.0).abs() < 1e-3);
        assert!((r.center().y - 400.0).abs() < 1e-3);
    }

    #[test]
    fn tall_video_in_wide_space_is_pillarboxed() {
        let r = fit_rect(outer(1600.0, 900.0), 9.0 / 16.0);
        assert_eq!(r.height(), 900.0);
        assert!((r.width() - 506.25).abs() < 1e-3);
        assert!((r.center().x - 800.0).abs() < 1e-3);
    }

    #[test]
    fn bad_ratio_fills_everything() {
        let o = outer(640.0, 360.0);
        assert_eq!(fit_rect(o, 0.0), o);
        assert_eq!(fit_rect(o, f32::NAN), o);
    }
}
