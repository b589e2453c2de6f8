use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use eframe::egui::{FontData, FontDefinitions, FontFamily};
use invoice_ai_desk::config::Config;
use invoice_ai_desk::error::DeskError;
use invoice_ai_desk::processing::ProcessingStage;
use invoice_ai_desk::registry::RegistryService;
use invoice_ai_desk::session::{NoticeLevel, RowAction, SessionController};
use invoice_ai_desk::template::TemplateSummary;

use crate::io::{spawn_folder_scan, spawn_processing, spawn_template_inspect, spawn_thumbnail};
use crate::model::{PickMessage, Tab, ThumbData, UiMessage};

const MAX_THUMBS: usize = 48;

pub struct DesktopApp {
    config: Config,
    controller: SessionController,
    tab: Tab,
    stage: ProcessingStage,
    process_rx: Option<Receiver<UiMessage>>,
    template_summary: Option<TemplateSummary>,
    pick_rx: Receiver<PickMessage>,
    pick_tx: mpsc::Sender<PickMessage>,
    scanning: bool,
    thumbs: HashMap<String, egui::TextureHandle>,
    thumb_rx: Receiver<ThumbData>,
    thumb_tx: mpsc::Sender<ThumbData>,
    thumb_inflight: HashSet<String>,
    pending_thumbs: Vec<ThumbData>,
}

impl DesktopApp {
    pub fn new(config: Config) -> Self {
        let registry = RegistryService::new(config.registry_path.clone());
        let (thumb_tx, thumb_rx) = mpsc::channel();
        let (pick_tx, pick_rx) = mpsc::channel();
        Self {
            config,
            controller: SessionController::new(registry),
            tab: Tab::default(),
            stage: ProcessingStage::Idle,
            process_rx: None,
            template_summary: None,
            pick_rx,
            pick_tx,
            scanning: false,
            thumbs: HashMap::new(),
            thumb_rx,
            thumb_tx,
            thumb_inflight: HashSet::new(),
            pending_thumbs: Vec::new(),
        }
    }

    pub fn load_history(&mut self) {
        // 失敗は通知に出ているので画面はそのまま
        let _ = self.controller.load_generated_files();
    }

    fn pick_image_folder(&mut self) {
        let Some(folder) = rfd::FileDialog::new()
            .set_title("Select Image Folder")
            .pick_folder()
        else {
            return;
        };
        self.scanning = true;
        spawn_folder_scan(folder, self.pick_tx.clone());
    }

    fn pick_template(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select Excel File")
            .add_filter("Excel Files (*.xlsx, *.xls)", &["xlsx", "xls"])
            .pick_file()
        else {
            return;
        };
        self.template_summary = None;
        if self.controller.select_template(&path).is_err() {
            return;
        }
        spawn_template_inspect(path, self.pick_tx.clone());
    }

    fn apply_pick(&mut self, msg: PickMessage) {
        match msg {
            PickMessage::FolderScanned(scanned) => {
                self.scanning = false;
                // 失敗時も選択は空になるのでサムネイルは捨てる
                let _ = self.controller.apply_folder_scan(scanned);
                self.thumbs.clear();
                self.thumb_inflight.clear();
                self.pending_thumbs.clear();
            }
            PickMessage::TemplateInspected { path, summary } => {
                let current = self
                    .controller
                    .template()
                    .is_some_and(|t| std::path::Path::new(&t.path) == path);
                if !current {
                    return;
                }
                match summary {
                    Ok(summary) => self.template_summary = Some(summary),
                    Err(err) => {
                        self.template_summary = None;
                        self.controller
                            .notices_mut()
                            .warning(format!("テンプレートの内容を確認できません: {err}"));
                    }
                }
            }
        }
    }

    fn run_processing(&mut self) {
        let Ok(submission) = self.controller.begin_submission() else {
            return;
        };
        let output_dir = match self.config.absolute_output_dir() {
            Ok(dir) => dir,
            Err(err) => {
                self.controller.finish_submission(&Err(err));
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        self.process_rx = Some(rx);
        self.stage = ProcessingStage::Idle;
        spawn_processing(
            self.config.engine_url.clone(),
            self.controller.registry().clone(),
            output_dir,
            submission,
            tx,
        );
    }

    fn poll_messages(&mut self) {
        while let Ok(msg) = self.thumb_rx.try_recv() {
            self.thumb_inflight.remove(&msg.path);
            self.pending_thumbs.push(msg);
        }
        while let Ok(msg) = self.pick_rx.try_recv() {
            self.apply_pick(msg);
        }

        let Some(rx) = &self.process_rx else {
            return;
        };
        let mut finished = None;
        loop {
            match rx.try_recv() {
                Ok(UiMessage::Stage(stage)) => self.stage = stage,
                Ok(UiMessage::Done(result)) => {
                    finished = Some(result);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = Some(Err(DeskError::EngineRejected(
                        "処理スレッドが応答なしで終了しました".into(),
                    )));
                    break;
                }
            }
        }

        if let Some(result) = finished {
            self.process_rx = None;
            self.stage = if result.is_ok() {
                ProcessingStage::Completed
            } else {
                ProcessingStage::Failed
            };
            let succeeded = result.is_ok();
            self.controller.finish_submission(&result);
            if succeeded {
                self.tab = Tab::Generated;
            }
        }
    }

    fn request_thumbnail(&mut self, path: &str) {
        if path.is_empty() || self.thumbs.contains_key(path) || self.thumb_inflight.contains(path) {
            return;
        }
        self.thumb_inflight.insert(path.to_string());
        spawn_thumbnail(path.to_string(), self.thumb_tx.clone());
    }

    fn process_pending_thumbs(&mut self, ctx: &egui::Context) {
        let pending = std::mem::take(&mut self.pending_thumbs);
        for msg in pending {
            if msg.size[0] == 0 || msg.size[1] == 0 {
                continue;
            }
            let color_image = egui::ColorImage::from_rgba_unmultiplied(msg.size, &msg.pixels);
            let texture = ctx.load_texture(&msg.path, color_image, egui::TextureOptions::default());
            self.thumbs.insert(msg.path, texture);
        }
    }

    fn render_upload(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let idle = !self.controller.is_submitting();
            if ui
                .add_enabled(idle && !self.scanning, egui::Button::new("Select Image Folder"))
                .clicked()
            {
                self.pick_image_folder();
            }
            if self.scanning {
                ui.spinner();
            }
            if ui.add_enabled(idle, egui::Button::new("Select Excel Template")).clicked() {
                self.pick_template();
            }
        });
        ui.add_space(6.0);

        ui.group(|ui| {
            ui.label(RichText::new("Images").strong());
            match self.controller.image_folder() {
                Some(folder) => {
                    ui.label(format!(
                        "{} ({} files)",
                        folder.display(),
                        self.controller.selected_images().len()
                    ));
                }
                None => {
                    ui.label("-");
                }
            }
        });

        ui.group(|ui| {
            ui.label(RichText::new("Template").strong());
            match self.controller.template() {
                Some(template) => {
                    ui.label(&template.path);
                    if let Some(summary) = &self.template_summary {
                        ui.label(
                            RichText::new(format!("Sheets: {}", summary.sheet_names.join(", ")))
                                .color(Color32::from_gray(170)),
                        );
                    }
                }
                None => {
                    ui.label("-");
                }
            }
        });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let label = if self.controller.is_submitting() {
                format!("{}...", self.stage.label())
            } else {
                "Process Invoices".to_string()
            };
            if ui
                .add_enabled(self.controller.can_submit() && !self.scanning, egui::Button::new(label))
                .clicked()
            {
                self.run_processing();
            }
            if self.controller.is_submitting() {
                ui.spinner();
            }
        });

        ui.separator();
        let paths: Vec<String> = self
            .controller
            .selected_images()
            .iter()
            .take(MAX_THUMBS)
            .map(|f| f.path.clone())
            .collect();
        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for path in &paths {
                    let thumb_size = egui::vec2(160.0, 120.0);
                    if let Some(texture) = self.thumbs.get(path) {
                        ui.add(egui::Image::new(texture).fit_to_exact_size(thumb_size));
                    } else {
                        self.request_thumbnail(path);
                        ui.allocate_ui_with_layout(
                            thumb_size,
                            egui::Layout::centered_and_justified(egui::Direction::LeftToRight),
                            |ui| {
                                ui.label("Loading...");
                            },
                        );
                    }
                }
            });
            let rest = self.controller.selected_images().len().saturating_sub(MAX_THUMBS);
            if rest > 0 {
                ui.label(format!("... and {rest} more"));
            }
        });
    }

    fn render_generated(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Generated Files");
            if ui.button("Reload").clicked() {
                self.load_history();
            }
        });
        ui.separator();

        let rows = self.controller.generated_files();
        if rows.is_empty() {
            ui.label("No generated files yet.");
            return;
        }

        let mut actions = Vec::new();
        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            egui::Grid::new("generated_files")
                .striped(true)
                .min_col_width(40.0)
                .show(ui, |ui| {
                    ui.label(RichText::new("#").strong());
                    ui.label(RichText::new("File").strong());
                    ui.label(RichText::new("Modified").strong());
                    ui.label("");
                    ui.end_row();

                    for row in rows {
                        ui.label(row.sequential_id.to_string());
                        ui.label(&row.display_name).on_hover_text(&row.path);
                        ui.label(&row.timestamp_label);
                        ui.horizontal(|ui| {
                            if ui.button("Open").clicked() {
                                actions.push(RowAction::Open(row.path.clone()));
                            }
                            if ui.button("Folder").clicked() {
                                actions.push(RowAction::OpenFolder(row.path.clone()));
                            }
                            if ui.button("Delete").clicked() {
                                actions.push(RowAction::Delete(row.path.clone()));
                            }
                        });
                        ui.end_row();
                    }
                });
        });

        for action in actions {
            // 失敗は通知に出る
            let _ = self.controller.apply(action);
        }
    }

    fn render_notices(&mut self, ui: &mut egui::Ui) {
        let mut dismissed = None;
        for (index, notice) in self.controller.notices().iter().enumerate() {
            let color = match notice.level {
                NoticeLevel::Info => Color32::from_gray(200),
                NoticeLevel::Success => Color32::from_rgb(120, 200, 120),
                NoticeLevel::Warning => Color32::from_rgb(246, 196, 69),
                NoticeLevel::Error => Color32::from_rgb(230, 100, 100),
            };
            ui.horizontal(|ui| {
                ui.label(RichText::new(&notice.message).color(color));
                if ui.small_button("x").clicked() {
                    dismissed = Some(index);
                }
            });
        }
        if let Some(index) = dismissed {
            self.controller.notices_mut().dismiss(index);
        }
    }
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\meiryo.ttc",
        r"C:\Windows\Fonts\msgothic.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("jp_fallback".to_string(), FontData::from_owned(data));
            fonts.families
                .entry(FontFamily::Proportional)
                .or_default()
                .push("jp_fallback".to_string());
            fonts.families
                .entry(FontFamily::Monospace)
                .or_default()
                .push("jp_fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_messages();
        self.process_pending_thumbs(ctx);
        self.controller.notices_mut().prune_expired(Instant::now());

        if self.controller.is_submitting()
            || self.scanning
            || !self.thumb_inflight.is_empty()
            || !self.pending_thumbs.is_empty()
        {
            ctx.request_repaint();
        } else if !self.controller.notices().is_empty() {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Upload, "Upload");
                ui.selectable_value(&mut self.tab, Tab::Generated, "Generated Files");
                ui.separator();
                ui.label(RichText::new(&self.config.engine_url).color(Color32::from_gray(140)));
            });
        });

        if !self.controller.notices().is_empty() {
            egui::TopBottomPanel::bottom("notices").show(ctx, |ui| {
                self.render_notices(ui);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Upload => self.render_upload(ui),
            Tab::Generated => self.render_generated(ui),
        });
    }
}
