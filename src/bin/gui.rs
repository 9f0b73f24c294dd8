#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use clap::Parser;
use eframe::{egui, App, Frame};
use image::GenericImageView;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::{
    fs,
    path::{Path, PathBuf},
};
use dafd_toolbox::{
    config::{self, Config},
    dispatch::{self, FormSnapshot},
    i18n::{self, keys, Translator},
    logging,
    metadata::{self, ModelFile},
    predict::DatasetModel,
    ui_cli,
    validation::{RangeWarning, WarningSink},
};

const LOGO_FILE: &str = "DAFD_logo.png";
const LOGO_MAX_WIDTH: f32 = 320.0;

#[derive(Debug, Parser)]
#[command(name = "dafd", version, about = "DAFD desktop interface")]
struct Args {
    /// 설정 파일 경로 (기본: ./dafd.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 언어 (auto/en-us/ko-kr)
    #[arg(short = 'L', long, default_value = "auto")]
    lang: String,
}

fn main() -> Result<(), eframe::Error> {
    let args = Args::parse();
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_FILE));
    let mut app_cfg = config::load_or_create(&config_path).unwrap_or_else(|e| {
        eprintln!("Config error: {e}");
        Config::default()
    });
    logging::init(&app_cfg.log_level);
    app_cfg.language = i18n::resolve_language(&args.lang, Some(app_cfg.language.as_str()));
    let tr = Translator::new_with_pack(&app_cfg.language, app_cfg.language_pack_dir.as_deref());

    // 설정된 모델을 읽지 못하면 내장 모델로 시작하고 오류를 화면에 남긴다.
    let (model, model_label, load_error) = match app_cfg.load_model() {
        Ok(model) => {
            let label = app_cfg
                .model_path
                .clone()
                .unwrap_or_else(|| tr.t(keys::MODEL_BUILT_IN));
            (model, label, None)
        }
        Err(e) => {
            tracing::error!("model load failed, using built-in dataset: {e}");
            match ModelFile::built_in().and_then(DatasetModel::from_model_file) {
                Ok(model) => {
                    let msg = format!("{}: {e}", tr.t(keys::MODEL_LOAD_ERROR));
                    (model, tr.t(keys::MODEL_BUILT_IN), Some(msg))
                }
                Err(fatal) => {
                    tracing::error!("built-in model unusable: {fatal}");
                    eprintln!("{}: {fatal}", tr.t(keys::MODEL_LOAD_ERROR));
                    return Ok(());
                }
            }
        }
    };

    let mut viewport = egui::ViewportBuilder::default().with_inner_size([620.0, 820.0]);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let title = tr.t(keys::APP_TITLE);
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            if let Err(e) = setup_fonts(&cc.egui_ctx) {
                tracing::warn!("font setup: {e}");
            }
            let mut app = DafdApp {
                config: app_cfg,
                config_path,
                tr,
                model,
                model_label,
                fields: Vec::new(),
                result_text: String::new(),
                error_text: load_error,
                logo: load_logo(&cc.egui_ctx),
            };
            app.reset_fields();
            Box::new(app)
        }),
    )
}

fn load_rgba(path: &Path) -> Option<(Vec<u8>, u32, u32)> {
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let (w, h) = img.dimensions();
    Some((img.to_rgba8().into_raw(), w, h))
}

fn load_app_icon() -> Option<egui::IconData> {
    let (rgba, width, height) = load_rgba(&metadata::resource_path(LOGO_FILE)?)?;
    Some(egui::IconData {
        rgba,
        width,
        height,
    })
}

fn load_logo(ctx: &egui::Context) -> Option<egui::TextureHandle> {
    let path = metadata::resource_path(LOGO_FILE)?;
    let (rgba, w, h) = load_rgba(&path)?;
    let image = egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &rgba);
    tracing::debug!(path = %path.display(), "logo loaded");
    Some(ctx.load_texture("dafd_logo", image, egui::TextureOptions::LINEAR))
}

/// 공통: 바이너리 폰트 바이트를 egui에 등록.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    let font_name = name.to_string();
    fonts
        .font_data
        .insert(font_name.clone(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .push(font_name.clone());
    fonts
        .families
        .entry(egui::FontFamily::Monospace)
        .or_default()
        .push(font_name);
    ctx.set_fonts(fonts);
}

/// 한글 라벨 표시용 대체 폰트를 등록한다.
/// 1) assets/fonts/ 의 번들 폰트
/// 2) 시스템 폰트(Windows 맑은 고딕, 리눅스 나눔/Noto CJK)
fn setup_fonts(ctx: &egui::Context) -> Result<(), String> {
    let bundled = ["fonts/NanumGothic.ttf", "fonts/malgun.ttf"]
        .iter()
        .find_map(|name| metadata::resource_path(name));
    let mut candidates: Vec<PathBuf> = bundled.into_iter().collect();
    if let Some(windir) = std::env::var_os("WINDIR") {
        candidates.push(Path::new(&windir).join("Fonts").join("malgun.ttf"));
    }
    candidates.push(PathBuf::from("/usr/share/fonts/truetype/nanum/NanumGothic.ttf"));
    candidates.push(PathBuf::from(
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ));
    candidates.push(PathBuf::from("/System/Library/Fonts/AppleSDGothicNeo.ttc"));

    let path = candidates
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| "no CJK font found; Korean labels may not render".to_string())?;
    let bytes = fs::read(&path)
        .map_err(|e| format!("Failed to read font file ({}): {e}", path.display()))?;
    apply_font_bytes(ctx, bytes, "cjk_fallback");
    Ok(())
}

/// 범위 경고를 모달 경고 대화상자로 띄운다. 닫을 때까지 다음 필드 처리를 멈춘다.
struct DialogWarnings<'a> {
    tr: &'a Translator,
}

impl WarningSink for DialogWarnings<'_> {
    fn warn(&mut self, warning: RangeWarning) {
        let (title, body) = self.tr.warning_text(&warning);
        let _ = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(&title)
            .set_description(&body)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Action {
    Inverse,
    Forward,
    OpenModel,
    BuiltInModel,
}

struct DafdApp {
    config: Config,
    config_path: PathBuf,
    tr: Translator,
    model: DatasetModel,
    model_label: String,
    /// 입력 파라미터 필드 다음에 출력 파라미터 필드
    fields: Vec<(String, String)>,
    result_text: String,
    error_text: Option<String>,
    logo: Option<egui::TextureHandle>,
}

impl DafdApp {
    fn reset_fields(&mut self) {
        let table = self.model.table();
        self.fields = table
            .inputs()
            .iter()
            .chain(table.outputs())
            .map(|name| (name.clone(), String::new()))
            .collect();
        self.result_text.clear();
    }

    /// 제출 시점의 필드 값 스냅샷.
    fn snapshot(&self) -> FormSnapshot {
        self.fields.iter().cloned().collect()
    }

    fn run_action(&mut self, action: Action) {
        match action {
            Action::Inverse | Action::Forward => self.submit(action),
            Action::OpenModel => {
                if let Some(path) = FileDialog::new().add_filter("TOML", &["toml"]).pick_file() {
                    self.open_model(path);
                }
            }
            Action::BuiltInModel => {
                self.set_model(ModelFile::built_in(), None);
            }
        }
    }

    fn submit(&mut self, action: Action) {
        let form = self.snapshot();
        let table = self.model.table();
        let mut sink = DialogWarnings { tr: &self.tr };
        let outcome = if action == Action::Inverse {
            dispatch::run_inverse(table, &self.model, &form, &mut sink)
        } else {
            dispatch::run_forward(table, &self.model, &form)
        };
        match outcome {
            Ok(text) => {
                self.result_text = text;
                self.error_text = None;
            }
            Err(e) => {
                tracing::error!("action aborted: {e}");
                self.result_text.clear();
                self.error_text = Some(ui_cli::error_line(&self.tr, &e));
            }
        }
    }

    fn open_model(&mut self, path: PathBuf) {
        let file = ModelFile::load(&path);
        self.set_model(file, Some(path));
    }

    fn set_model(
        &mut self,
        file: Result<ModelFile, metadata::MetadataError>,
        path: Option<PathBuf>,
    ) {
        match file.and_then(DatasetModel::from_model_file) {
            Ok(model) => {
                tracing::info!(samples = model.len(), "model replaced");
                self.model = model;
                self.model_label = match &path {
                    Some(p) => p.display().to_string(),
                    None => self.tr.t(keys::MODEL_BUILT_IN),
                };
                self.config.model_path = path.map(|p| p.display().to_string());
                self.error_text = None;
                self.reset_fields();
                if let Err(e) = self.config.save_to(&self.config_path) {
                    tracing::warn!("config save failed: {e}");
                }
            }
            Err(e) => {
                tracing::error!("model load failed: {e}");
                self.error_text = Some(format!("{}: {e}", self.tr.t(keys::MODEL_LOAD_ERROR)));
            }
        }
    }

    fn ui_fields(ui: &mut egui::Ui, id: &str, labels: &[String], fields: &mut [(String, String)]) {
        egui::Grid::new(id)
            .num_columns(2)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                for (label, (_, text)) in labels.iter().zip(fields.iter_mut()) {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(label);
                    });
                    ui.add(egui::TextEdit::singleline(text).desired_width(180.0));
                    ui.end_row();
                }
            });
    }
}

impl App for DafdApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let mut action = None;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button(self.tr.t(keys::MENU_FILE), |ui| {
                    if ui.button(self.tr.t(keys::MENU_OPEN_MODEL)).clicked() {
                        action = Some(Action::OpenModel);
                        ui.close_menu();
                    }
                    if ui.button(self.tr.t(keys::MENU_BUILT_IN_MODEL)).clicked() {
                        action = Some(Action::BuiltInModel);
                        ui.close_menu();
                    }
                });
                ui.separator();
                ui.small(format!("{} {}", self.tr.t(keys::MODEL_SOURCE), self.model_label));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        if let Some(logo) = &self.logo {
                            let size = logo.size_vec2();
                            let scale = (LOGO_MAX_WIDTH / size.x).min(1.0);
                            ui.add(egui::Image::new((logo.id(), size * scale)));
                        }

                        let table = self.model.table();
                        let labels = |names: &[String]| -> Vec<String> {
                            names
                                .iter()
                                .map(|n| table.field_label(n).unwrap_or_else(|| format!("{n} : ")))
                                .collect()
                        };
                        let input_labels = labels(table.inputs());
                        let output_labels = labels(table.outputs());
                        let (input_fields, output_fields) =
                            self.fields.split_at_mut(input_labels.len());

                        ui.add_space(8.0);
                        ui.heading(self.tr.t(keys::CONSTRAINTS_HEADING))
                            .on_hover_text(self.tr.t(keys::CONSTRAINTS_HINT));
                        Self::ui_fields(ui, "constraints_grid", &input_labels, input_fields);

                        ui.add_space(20.0);
                        ui.heading(self.tr.t(keys::DESIRED_HEADING))
                            .on_hover_text(self.tr.t(keys::DESIRED_HINT));
                        Self::ui_fields(ui, "desired_grid", &output_labels, output_fields);

                        ui.add_space(20.0);
                        if ui.button(self.tr.t(keys::BUTTON_RUN_INVERSE)).clicked() {
                            action = Some(Action::Inverse);
                        }
                        if ui
                            .button(self.tr.t(keys::BUTTON_RUN_FORWARD))
                            .on_hover_text(self.tr.t(keys::FORWARD_HINT))
                            .clicked()
                        {
                            action = Some(Action::Forward);
                        }

                        ui.add_space(12.0);
                        if let Some(err) = &self.error_text {
                            let color = ui.visuals().error_fg_color;
                            ui.colored_label(color, err);
                        }
                        if !self.result_text.is_empty() {
                            ui.label(egui::RichText::new(&self.result_text).monospace());
                        }
                    });
                });
        });

        if let Some(action) = action {
            self.run_action(action);
        }
    }
}
