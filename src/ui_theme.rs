use crate::session::NoticeKind;
use eframe::egui::{self, Color32, FontFamily, FontId, Rounding, Shadow, Stroke, Vec2};

pub struct Theme {
    // Colors
    pub background: Color32,
    pub surface: Color32,
    pub surface_hover: Color32,
    pub card: Color32,
    pub border: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,
    pub accent: Color32,
    pub accent_hover: Color32,
    pub disabled: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,
    pub info: Color32,

    // Spacing
    pub spacing_small: f32,
    pub spacing_medium: f32,
    pub spacing_large: f32,
    pub padding_medium: f32,

    pub radius_small: Rounding,
    pub radius_medium: Rounding,
    pub radius_large: Rounding,

    pub shadow_medium: Shadow,

    pub font_small: FontId,
    pub font_medium: FontId,
    pub font_title: FontId,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(30, 30, 30),
            surface: Color32::from_rgb(45, 45, 45),
            surface_hover: Color32::from_rgb(55, 55, 55),
            card: Color32::from_rgb(40, 40, 40),
            border: Color32::from_rgb(70, 70, 70),
            text_primary: Color32::from_rgb(255, 255, 255),
            text_secondary: Color32::from_rgb(200, 200, 200),
            text_muted: Color32::from_rgb(140, 140, 140),
            accent: Color32::from_rgb(0, 122, 255),
            accent_hover: Color32::from_rgb(10, 132, 255),
            disabled: Color32::from_rgb(100, 100, 100),
            success: Color32::from_rgb(52, 199, 89),
            warning: Color32::from_rgb(255, 149, 0),
            error: Color32::from_rgb(255, 59, 48),
            info: Color32::from_rgb(90, 200, 250),

            spacing_small: 4.0,
            spacing_medium: 8.0,
            spacing_large: 12.0,
            padding_medium: 8.0,

            radius_small: Rounding::same(6.0),
            radius_medium: Rounding::same(10.0),
            radius_large: Rounding::same(16.0),

            shadow_medium: Shadow {
                offset: Vec2::new(0.0, 2.0),
                blur: 8.0,
                spread: 0.0,
                color: Color32::from_black_alpha(40),
            },

            font_small: FontId::new(12.0, FontFamily::Proportional),
            font_medium: FontId::new(14.0, FontFamily::Proportional),
            font_title: FontId::new(20.0, FontFamily::Proportional),
        }
    }
}

impl Theme {
    pub fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card;
        style.visuals.window_shadow = self.shadow_medium;
        style.visuals.window_rounding = self.radius_large;
        style.visuals.window_stroke = Stroke::new(1.0, self.border);

        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_primary);
        style.visuals.widgets.inactive.bg_fill = self.surface;
        style.visuals.widgets.inactive.weak_bg_fill = self.surface;
        style.visuals.widgets.inactive.rounding = self.radius_small;
        style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, self.border);

        style.visuals.widgets.hovered.bg_fill = self.surface_hover;
        style.visuals.widgets.hovered.weak_bg_fill = self.surface_hover;
        style.visuals.widgets.hovered.rounding = self.radius_small;

        style.visuals.text_cursor.stroke = Stroke::new(2.0, self.accent);
        style.visuals.selection.bg_fill = self.accent;
        style.visuals.selection.stroke = Stroke::new(1.0, self.accent);

        style.text_styles = [
            (egui::TextStyle::Heading, self.font_title.clone()),
            (egui::TextStyle::Body, self.font_medium.clone()),
            (egui::TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
            (egui::TextStyle::Button, self.font_medium.clone()),
            (egui::TextStyle::Small, self.font_small.clone()),
        ]
        .into();

        ctx.set_style(style);
    }

    pub fn card_frame(&self) -> egui::Frame {
        egui::Frame {
            inner_margin: egui::Margin::same(self.padding_medium),
            rounding: self.radius_large,
            shadow: self.shadow_medium,
            fill: self.card,
            ..Default::default()
        }
    }

    /// Fill for the main action button.
    pub fn primary_fill(&self, enabled: bool, hovered: bool) -> Color32 {
        match (enabled, hovered) {
            (false, _) => self.disabled,
            (true, true) => self.accent_hover,
            (true, false) => self.accent,
        }
    }

    pub fn notice_color(&self, kind: NoticeKind) -> Color32 {
        match kind {
            NoticeKind::Info => self.info,
            NoticeKind::Success => self.success,
            NoticeKind::Warning => self.warning,
            NoticeKind::Error => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_fill() {
        let theme = Theme::default();
        assert_eq!(theme.primary_fill(false, true), theme.disabled);
        assert_eq!(theme.primary_fill(true, false), theme.accent);
        assert_eq!(theme.primary_fill(true, true), theme.accent_hover);
    }

    #[test]
    fn test_notice_colors_are_distinct() {
        let theme = Theme::default();
        let kinds = [NoticeKind::Info, NoticeKind::Success, NoticeKind::Warning, NoticeKind::Error];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(theme.notice_color(*a), theme.notice_color(*b));
            }
        }
    }
}
