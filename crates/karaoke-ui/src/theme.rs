// src/theme.rs
//
// Dark window with a pink accent. Only the widgets the player shows are
// restyled (buttons, the Rec toggle, sliders, path fields and menus); the
// rest keeps egui's dark defaults.
use egui::style::WidgetVisuals;
use egui::{Color32, Context, CornerRadius, Stroke, Visuals};

const ACCENT:     Color32 = Color32::from_rgb(236,  72, 153);
const ACCENT_DIM: Color32 = Color32::from_rgb(150,  40,  96);

const BG_PANEL:   Color32 = Color32::from_rgb( 22,  19,  28);
const BG_FIELD:   Color32 = Color32::from_rgb( 14,  12,  18);
const BG_WIDGET:  Color32 = Color32::from_rgb( 42,  36,  52);
const BG_HOVER:   Color32 = Color32::from_rgb( 56,  48,  68);
const TEXT:       Color32 = Color32::from_rgb(225, 220, 232);

pub const DARK_TEXT_DIM: Color32 = Color32::from_rgb(130, 122, 145);
/// Fill of the checked Rec button.
pub const REC_ACTIVE:    Color32 = Color32::from_rgb(210,  40,  40);
/// Status line text.
pub const STATUS_ERROR:  Color32 = Color32::from_rgb(240, 110,  90);
/// Letterbox around the video.
pub const MONITOR_BG:    Color32 = Color32::BLACK;

fn paint(w: &mut WidgetVisuals, fill: Color32, border: Color32, text: Color32) {
    w.bg_fill       = fill;
    w.weak_bg_fill  = fill;
    w.bg_stroke     = Stroke::new(1.0, border);
    w.fg_stroke     = Stroke::new(1.0, text);
    w.corner_radius = CornerRadius::same(3);
}

fn visuals() -> Visuals {
    let mut v = Visuals::dark();
    v.panel_fill           = BG_PANEL;
    // Path fields and slider rails.
    v.extreme_bg_color     = BG_FIELD;
    // Checked Rec button and the filled part of both sliders.
    v.selection.bg_fill    = ACCENT;
    v.selection.stroke     = Stroke::new(1.0, Color32::WHITE);
    v.slider_trailing_fill = true;

    paint(&mut v.widgets.inactive, BG_WIDGET,  BG_HOVER,   TEXT);
    paint(&mut v.widgets.hovered,  BG_HOVER,   ACCENT_DIM, Color32::WHITE);
    paint(&mut v.widgets.active,   ACCENT_DIM, ACCENT,     Color32::WHITE);
    // An open menu looks hovered.
    v.widgets.open = v.widgets.hovered;
    v
}

pub fn configure_style(ctx: &Context) {
    ctx.set_visuals(visuals());
    ctx.style_mut(|s| {
        s.spacing.button_padding  = egui::vec2(12.0, 4.0);
        s.spacing.interact_size.y = 24.0;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_fill_from_the_weak_fill_too() {
        let v = visuals();
        assert_eq!(v.widgets.inactive.weak_bg_fill, BG_WIDGET);
        assert_eq!(v.widgets.open.bg_fill, v.widgets.hovered.bg_fill);
        assert!(v.dark_mode);
    }
}
