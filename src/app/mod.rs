mod ui;

use crate::config::UploaderConfig;
use crate::results::ResultTable;
use crate::session::UploadSession;
use crate::upload::{FileValidator, HttpTransport, Transport};
use crate::utils::file_size::human_size;
use egui::Color32;
use eframe::App;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

const BUSY_REPAINT: Duration = Duration::from_millis(50);

pub struct PatentUploader {
    session: UploadSession,
    results: ResultTable,
    transport: Box<dyn Transport>,
    validator: FileValidator,
    accent: Color32,
    selected_label: Rc<RefCell<Option<String>>>,
}

impl PatentUploader {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: UploaderConfig) -> Self {
        tracing::info!(endpoint = %config.endpoint, "Initializing patent uploader");
        let transport = Box::new(HttpTransport::new(&config));
        Self::with_transport(&config, transport)
    }

    pub fn with_transport(config: &UploaderConfig, transport: Box<dyn Transport>) -> Self {
        let mut session = UploadSession::new(config.reset_delay());

        let selected_label = Rc::new(RefCell::new(None));
        let label = Rc::clone(&selected_label);
        session.subscribe_selection(move |file| {
            *label.borrow_mut() = file.map(|f| format!("{} ({})", f.name, human_size(f.size)));
        });

        Self {
            session,
            results: ResultTable::new(),
            transport,
            validator: FileValidator::from_config(config),
            accent: config.accent(),
            selected_label,
        }
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn results(&self) -> &ResultTable {
        &self.results
    }

    /// Label for the selected file, kept current by the selection subscription.
    pub fn selected_label(&self) -> Option<String> {
        self.selected_label.borrow().clone()
    }

    /// Runs picked or dropped paths through the validator. Rejections are
    /// reported before the accepted file is selected, so they cannot clear it.
    pub fn accept_paths(&mut self, paths: &[PathBuf]) {
        let (chosen, rejected) = self.validator.check_many(paths);
        if !rejected.is_empty() {
            self.session.on_file_rejected(&rejected);
        }
        if let Some(file) = chosen {
            self.session.select_file(file);
        }
    }

    pub fn pick_file(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("PDF document", &["pdf"])
            .pick_file();
        if let Some(path) = picked {
            self.accept_paths(&[path]);
        }
    }

    pub fn start_upload(&mut self) {
        if let Err(e) = self.session.submit(self.transport.as_ref()) {
            tracing::debug!(error = %e, "Submit rejected");
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if self.session.poll(&mut self.results, now) {
            ctx.request_repaint();
        }
        if self.session.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
        if let Some(remaining) = self.session.reset_remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            if self.session.is_busy() {
                tracing::debug!(count = dropped.len(), "Ignoring drop during upload");
            } else {
                self.accept_paths(&dropped);
            }
        }
    }
}

impl App for PatentUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
