use crate::config::PipelineConfig;
use crate::preview::{self, PREVIEW_SIZE};
use crate::session::Session;
use crate::ui_theme::Theme;
use crate::worker::GenerationWorker;
use eframe::egui::{self, Stroke};
use std::path::PathBuf;

const PAYLOAD_PLACEHOLDER: &str = "Text or link to encode...";
const PREVIEW_TEXTURE: &str = "qr-preview";
const PATH_DISPLAY_CHARS: usize = 48;

pub struct QrBackdropApp {
    session: Session,
    worker: GenerationWorker,
    preview: Option<egui::TextureHandle>,
    theme: Theme,
}

impl QrBackdropApp {
    pub fn new(config: PipelineConfig) -> std::io::Result<Self> {
        // Results land next to wherever the app was started from.
        let output_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        log::info!("Saving generated images to {}", output_dir.display());

        Ok(Self {
            session: Session::new(output_dir),
            worker: GenerationWorker::new(config)?,
            preview: None,
            theme: Theme::default(),
        })
    }

    fn select_background(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Choose Background Image")
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.session.select_background(path);
        }
    }

    fn generate(&mut self, ctx: &egui::Context) {
        let Ok(request) = self.session.begin_generation() else {
            return;
        };

        let ctx = ctx.clone();
        self.worker.submit(request, move || ctx.request_repaint());
    }

    fn poll_worker(&mut self, ctx: &egui::Context) {
        while let Some(result) = self.worker.try_recv() {
            let succeeded = result.is_ok();
            self.session.finish_generation(result);
            if succeeded {
                self.refresh_preview(ctx);
            }
        }
    }

    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let Some(path) = self.session.last_output() else {
            return;
        };

        match preview::load_color_image(path) {
            Ok(image) => {
                self.preview = Some(ctx.load_texture(
                    PREVIEW_TEXTURE,
                    image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(e) => self.session.report_error(e.to_string()),
        }
    }

    fn shorten_with_front_ellipsis(text: &str, max_chars: usize) -> String {
        let char_count = text.chars().count();
        if char_count <= max_chars {
            return text.to_string();
        }

        let tail: String = text.chars().skip(char_count - max_chars).collect();
        format!("...{}", tail)
    }
}

impl eframe::App for QrBackdropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);
        self.poll_worker(ctx);

        let modal_open = self.session.notice().is_some();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal_open, |ui| {
                ui.add_space(self.theme.padding_medium);
                self.show_inputs(ui);
                self.show_actions(ui);
                self.show_preview(ui);
                self.show_activity(ui);
            });
        });

        self.show_notice(ctx);
    }
}

impl QrBackdropApp {
    fn show_inputs(&mut self, ui: &mut egui::Ui) {
        let frame = self.theme.card_frame();
        let mut submit = false;

        frame.show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new("Enter the QR code content:")
                        .color(self.theme.text_secondary),
                );
                ui.add_space(self.theme.spacing_small);

                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.session.payload)
                        .font(egui::TextStyle::Body)
                        .margin(egui::Vec2::new(8.0, 4.0))
                        .desired_width(f32::INFINITY)
                        .hint_text(PAYLOAD_PLACEHOLDER),
                );
                submit = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.add_space(self.theme.spacing_medium);

                ui.horizontal(|ui| {
                    let (path_text, color) = match self.session.background() {
                        Some(path) => (
                            Self::shorten_with_front_ellipsis(
                                &path.display().to_string(),
                                PATH_DISPLAY_CHARS,
                            ),
                            self.theme.text_primary,
                        ),
                        None => ("No background selected".to_string(), self.theme.text_muted),
                    };

                    if ui
                        .add_sized(
                            [160.0, 26.0],
                            egui::Button::new(
                                egui::RichText::new("Choose Background")
                                    .color(self.theme.text_primary),
                            ),
                        )
                        .clicked()
                    {
                        self.select_background();
                    }

                    ui.add_space(self.theme.spacing_small);
                    ui.add(egui::Label::new(egui::RichText::new(path_text).color(color)).truncate());
                });
            });
        });
        ui.add_space(self.theme.spacing_medium);

        if submit {
            self.generate(ui.ctx());
        }
    }

    fn show_actions(&mut self, ui: &mut egui::Ui) {
        let busy = self.session.is_busy();
        let enabled = !busy;

        ui.horizontal(|ui| {
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(160.0, 36.0),
                if enabled {
                    egui::Sense::click()
                } else {
                    egui::Sense::hover()
                },
            );

            let button = egui::Button::new(
                egui::RichText::new("Generate QR Code")
                    .size(14.0)
                    .color(egui::Color32::WHITE)
                    .strong(),
            )
            .rounding(self.theme.radius_medium)
            .fill(self.theme.primary_fill(enabled, response.hovered()))
            .stroke(if enabled {
                Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(255, 255, 255, 30))
            } else {
                Stroke::NONE
            });

            if ui.put(rect, button).clicked() && enabled {
                self.generate(ui.ctx());
            }

            if busy {
                ui.add_space(self.theme.spacing_medium);
                ui.spinner();
                ui.label(egui::RichText::new("Generating...").color(self.theme.text_muted));

                if ui
                    .add_sized([90.0, 36.0], egui::Button::new("Cancel"))
                    .clicked()
                {
                    self.worker.cancel();
                }
            }
        });
        ui.add_space(self.theme.spacing_large);
    }

    fn show_preview(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            let (rect, _) = ui.allocate_exact_size(PREVIEW_SIZE, egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, self.theme.radius_small, self.theme.surface);

            if let Some(texture) = &self.preview {
                let size = preview::fit_within(texture.size(), PREVIEW_SIZE);
                egui::Image::new(egui::load::SizedTexture::new(texture.id(), size))
                    .paint_at(ui, egui::Rect::from_center_size(rect.center(), size));
            } else {
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No QR code yet",
                    self.theme.font_medium.clone(),
                    self.theme.text_muted,
                );
            }

            if let Some(path) = self.session.last_output() {
                ui.add_space(self.theme.spacing_small);
                ui.label(
                    egui::RichText::new(path.display().to_string())
                        .size(11.0)
                        .color(self.theme.text_muted),
                );
            }
        });
        ui.add_space(self.theme.spacing_medium);
    }

    fn show_activity(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new(
            egui::RichText::new("Activity").color(self.theme.text_secondary),
        )
        .default_open(false)
        .show(ui, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("activity_scroll")
                .max_height(120.0)
                .stick_to_bottom(true)
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    if self.session.activity().is_empty() {
                        ui.label(egui::RichText::new("Nothing yet").color(self.theme.text_muted));
                    }
                    for entry in self.session.activity() {
                        ui.label(
                            egui::RichText::new(entry)
                                .size(12.0)
                                .color(self.theme.text_secondary),
                        );
                    }
                });
        });
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.session.notice().cloned() else {
            return;
        };

        let mut dismissed = ctx.input(|i| i.key_pressed(egui::Key::Escape));

        egui::Window::new(notice.title.as_str())
            .id(egui::Id::new("notice_window"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_max_width(360.0);
                ui.label(
                    egui::RichText::new(&notice.message)
                        .color(self.theme.notice_color(notice.kind)),
                );
                ui.add_space(self.theme.spacing_medium);
                ui.vertical_centered(|ui| {
                    if ui.add_sized([80.0, 26.0], egui::Button::new("OK")).clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.session.dismiss_notice();
        }
    }
}
