use super::PatentUploader;
use crate::results::truncate_for_display;
use crate::session::UploadPhase;
use egui::{Color32, RichText};

const CELL_PREVIEW_CHARS: usize = 60;

impl PatentUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Patent Uploader");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Upload a patent PDF and review what the backend returns")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);
                self.render_picker(ui);

                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.add_enabled_ui(self.session.can_submit(), |ui| {
                        let button =
                            egui::Button::new("📤 Upload").min_size(egui::vec2(200.0, 40.0));
                        if ui.add(button).clicked() {
                            self.start_upload();
                        }
                    });
                });

                ui.add_space(20.0);
                self.render_progress(ui);

                if !self.results.is_empty() {
                    ui.add_space(20.0);
                    self.render_results(ui);
                }

                ui.add_space(20.0);
            });
        });
    }

    fn render_picker(&mut self, ui: &mut egui::Ui) {
        let busy = self.session.is_busy();

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.add_enabled_ui(!busy, |ui| {
                    if ui.button("📄 Select PDF").clicked() {
                        self.pick_file();
                    }
                });

                match self.selected_label() {
                    Some(label) => {
                        ui.label(format!("Selected: {}", label));
                        if ui.small_button("👁").on_hover_text("Open file").clicked() {
                            if let Some(file) = self.session.selected_file() {
                                if let Err(e) = open::that(&file.path) {
                                    tracing::warn!(file_name = %file.name, error = %e, "Failed to open file");
                                }
                            }
                        }
                        let remove = ui
                            .add_enabled(!busy, egui::Button::new("✖").small())
                            .on_hover_text("Remove file");
                        if remove.clicked() {
                            self.session.clear_selection();
                        }
                    }
                    None => {
                        ui.label(
                            RichText::new("…or drop a file onto this window")
                                .color(ui.visuals().weak_text_color()),
                        );
                    }
                }
            });
        });
    }

    fn render_progress(&self, ui: &mut egui::Ui) {
        let phase = self.session.phase();
        let status = self.session.status_message();
        if phase == UploadPhase::Idle && status.is_empty() {
            return;
        }

        ui.group(|ui| {
            if phase != UploadPhase::Idle {
                let progress_bar = egui::ProgressBar::new(self.session.progress() / 100.0)
                    .show_percentage()
                    .animate(phase == UploadPhase::Uploading)
                    .fill(self.accent);
                ui.add(progress_bar);
            }

            if !status.is_empty() {
                let color = match phase {
                    UploadPhase::Failed => ui.visuals().error_fg_color,
                    UploadPhase::Succeeded => Color32::from_rgb(0, 180, 0),
                    _ => ui.visuals().text_color(),
                };
                ui.colored_label(color, status);
            }
        });
    }

    fn render_results(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new(format!("Results ({})", self.results.len())).strong());
        ui.add_space(8.0);

        let columns = self.results.columns();
        egui::ScrollArea::horizontal()
            .id_source("results_scroll")
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        egui::Grid::new("results_grid")
                            .num_columns(columns.len())
                            .striped(true)
                            .spacing([16.0, 6.0])
                            .show(ui, |ui| {
                                for column in columns {
                                    ui.label(RichText::new(column).strong());
                                }
                                ui.end_row();

                                for row in self.results.rows() {
                                    for text in row.cells() {
                                        let (preview, truncated) =
                                            truncate_for_display(text, CELL_PREVIEW_CHARS);
                                        let label = ui.label(preview);
                                        if truncated {
                                            label.on_hover_text(text);
                                        }
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}
