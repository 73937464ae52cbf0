//! Lifecycle of a single upload: idle → uploading → succeeded | failed.
//!
//! The session owns the selected file, progress and status text that the UI
//! renders. It hands the file to a [`Transport`], drains the transport's
//! events from the frame loop via [`UploadSession::poll`], and records every
//! settlement in the [`ResultTable`].

mod reset;
mod selection;

pub use reset::ResetTimer;
pub use selection::FileSlot;

use crate::error::SessionError;
use crate::results::{cell_text, ResultEntry, ResultTable};
use crate::upload::{RejectedFile, SelectedFile, Transport, TransportError, TransportEvent};
use derivative::Derivative;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

pub const NO_FILE_MESSAGE: &str = "Please select a file first";
pub const UPLOADING_MESSAGE: &str = "Uploading...";
pub const SUCCESS_MESSAGE: &str = "Upload successful!";

/// Progress reported while uploading stays below this, so that 100 is only
/// ever shown once the backend has answered.
const IN_FLIGHT_CEILING: f32 = 99.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

struct InFlight {
    file_name: String,
    events: Receiver<TransportEvent>,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct UploadSession {
    selection: FileSlot,
    phase: UploadPhase,
    progress: f32,
    status_message: String,
    reset_delay: Duration,
    reset: ResetTimer,
    #[derivative(Debug = "ignore")]
    in_flight: Option<InFlight>,
}

impl UploadSession {
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            selection: FileSlot::default(),
            phase: UploadPhase::Idle,
            progress: 0.0,
            status_message: String::new(),
            reset_delay,
            reset: ResetTimer::default(),
            in_flight: None,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Percent in `[0, 100]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selection.get()
    }

    pub fn is_busy(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    pub fn can_submit(&self) -> bool {
        !self.is_busy() && self.selection.get().is_some()
    }

    pub fn reset_pending(&self) -> bool {
        self.reset.is_pending()
    }

    /// Time until the post-success reset, used by the UI to schedule a repaint.
    pub fn reset_remaining(&self, now: Instant) -> Option<Duration> {
        self.reset.remaining(now)
    }

    pub fn subscribe_selection(&mut self, callback: impl FnMut(Option<&SelectedFile>) + 'static) {
        self.selection.subscribe(callback);
    }

    /// Chooses the file for the next upload. A pending post-success reset is
    /// applied right away so it cannot clear the new selection later.
    pub fn select_file(&mut self, file: SelectedFile) {
        if self.reset.is_pending() {
            self.reset.cancel();
            self.apply_reset();
        }
        tracing::info!(file_name = %file.name, size = file.size, "File selected");
        self.selection.set(Some(file));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Reports the first rejected candidate and drops the current selection.
    pub fn on_file_rejected(&mut self, candidates: &[RejectedFile]) {
        if let Some(first) = candidates.first() {
            tracing::warn!(
                file_name = %first.name,
                reason = %first.reason,
                rejected = candidates.len(),
                "Rejected file"
            );
        }
        self.selection.clear();
    }

    /// Starts uploading the selected file.
    ///
    /// Rejected with `SubmissionInProgress` (and no other effect) while an
    /// upload is running, and with `NoFileSelected` when nothing is selected.
    pub fn submit(&mut self, transport: &dyn Transport) -> Result<(), SessionError> {
        if self.is_busy() {
            tracing::debug!("Submit ignored, upload already in flight");
            return Err(SessionError::SubmissionInProgress);
        }

        let Some(file) = self.selection.get().cloned() else {
            self.status_message = NO_FILE_MESSAGE.to_string();
            return Err(SessionError::NoFileSelected);
        };

        self.reset.cancel();
        self.phase = UploadPhase::Uploading;
        self.progress = 0.0;
        self.status_message = UPLOADING_MESSAGE.to_string();

        tracing::info!(file_name = %file.name, "Upload started");
        let events = transport.submit_file(&file);
        self.in_flight = Some(InFlight {
            file_name: file.name,
            events,
        });
        Ok(())
    }

    /// Applies every transport event that has arrived, then fires the reset
    /// timer if it is due. Returns whether anything visible changed.
    pub fn poll(&mut self, table: &mut ResultTable, now: Instant) -> bool {
        let mut changed = false;

        while let Some(event) = self.next_event() {
            self.apply(event, table, now);
            changed = true;
        }

        if self.reset.fire_if_due(now) {
            self.apply_reset();
            changed = true;
        }

        changed
    }

    fn next_event(&mut self) -> Option<TransportEvent> {
        let in_flight = self.in_flight.as_ref()?;
        match in_flight.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(TransportEvent::Failed(
                TransportError::with_message("Upload worker stopped without a result"),
            )),
        }
    }

    fn apply(&mut self, event: TransportEvent, table: &mut ResultTable, now: Instant) {
        match event {
            TransportEvent::Progress(percent) => {
                if self.phase == UploadPhase::Uploading && !percent.is_nan() {
                    let percent = percent.clamp(0.0, 100.0).min(IN_FLIGHT_CEILING);
                    self.progress = self.progress.max(percent);
                }
            }
            TransportEvent::Succeeded(payload) => {
                let Some(in_flight) = self.in_flight.take() else {
                    return;
                };
                self.phase = UploadPhase::Succeeded;
                self.progress = 100.0;
                self.status_message = payload
                    .get("message")
                    .map(cell_text)
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| SUCCESS_MESSAGE.to_string());

                tracing::info!(file_name = %in_flight.file_name, "Upload succeeded");
                table.append(in_flight.file_name, payload);
                self.reset.schedule(now, self.reset_delay);
            }
            TransportEvent::Failed(err) => {
                let Some(in_flight) = self.in_flight.take() else {
                    return;
                };
                let message = err.display_message().to_string();
                self.phase = UploadPhase::Failed;
                self.progress = 0.0;
                self.status_message = format!("Error: {}", message);

                tracing::warn!(file_name = %in_flight.file_name, error = %message, "Upload settled with error");
                table.append(in_flight.file_name, ResultEntry::error_payload(message));
            }
        }
    }

    fn apply_reset(&mut self) {
        if self.phase == UploadPhase::Uploading {
            return;
        }
        if self.selection.get().is_some() {
            self.selection.clear();
        }
        self.status_message.clear();
        self.progress = 0.0;
        if self.phase == UploadPhase::Succeeded {
            self.phase = UploadPhase::Idle;
        }
        tracing::debug!("Session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use serde_json::json;
    use std::cell::RefCell;
    use std::sync::mpsc::{channel, Sender};

    /// Hands out channels whose sending halves the test drives by hand.
    #[derive(Default)]
    struct ManualTransport {
        senders: RefCell<Vec<Sender<TransportEvent>>>,
        submitted: RefCell<Vec<String>>,
    }

    impl ManualTransport {
        fn send(&self, event: TransportEvent) {
            let senders = self.senders.borrow();
            senders.last().unwrap().send(event).unwrap();
        }
    }

    impl Transport for ManualTransport {
        fn submit_file(&self, file: &SelectedFile) -> Receiver<TransportEvent> {
            let (sender, receiver) = channel();
            self.senders.borrow_mut().push(sender);
            self.submitted.borrow_mut().push(file.name.clone());
            receiver
        }
    }

    fn session() -> UploadSession {
        UploadSession::new(Duration::from_millis(2000))
    }

    fn payload(value: serde_json::Value) -> crate::results::Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn submit_without_file_sets_status_only() {
        let transport = ManualTransport::default();
        let mut session = session();

        assert_eq!(session.submit(&transport), Err(SessionError::NoFileSelected));
        assert_eq!(session.phase(), UploadPhase::Idle);
        assert_eq!(session.status_message(), NO_FILE_MESSAGE);
        assert!(transport.submitted.borrow().is_empty());
    }

    #[test]
    fn second_submit_while_uploading_is_rejected() {
        let transport = ManualTransport::default();
        let mut session = session();
        session.select_file(SelectedFile::new("a.pdf", 10));
        session.submit(&transport).unwrap();

        assert_eq!(
            session.submit(&transport),
            Err(SessionError::SubmissionInProgress)
        );
        assert_eq!(transport.submitted.borrow().len(), 1);
        assert_eq!(session.status_message(), UPLOADING_MESSAGE);
    }

    #[test]
    fn progress_is_clamped_monotonic_and_below_done() {
        let transport = ManualTransport::default();
        let mut table = ResultTable::new();
        let mut session = session();
        session.select_file(SelectedFile::new("a.pdf", 10));
        session.submit(&transport).unwrap();

        let now = Instant::now();
        transport.send(TransportEvent::Progress(40.0));
        session.poll(&mut table, now);
        assert_eq!(session.progress(), 40.0);

        transport.send(TransportEvent::Progress(10.0));
        transport.send(TransportEvent::Progress(-5.0));
        transport.send(TransportEvent::Progress(f32::NAN));
        session.poll(&mut table, now);
        assert_eq!(session.progress(), 40.0);

        transport.send(TransportEvent::Progress(250.0));
        session.poll(&mut table, now);
        assert_eq!(session.progress(), IN_FLIGHT_CEILING);
        assert_eq!(session.phase(), UploadPhase::Uploading);
    }

    #[test]
    fn success_records_row_and_resets_after_delay() {
        let transport = ManualTransport::default();
        let mut table = ResultTable::new();
        let mut session = session();
        session.select_file(SelectedFile::new("a.pdf", 10));
        session.submit(&transport).unwrap();

        let start = Instant::now();
        transport.send(TransportEvent::Succeeded(payload(
            json!({"message": "Файл патента успешно получен и обработан", "status": "processed"}),
        )));
        assert!(session.poll(&mut table, start));

        assert_eq!(session.phase(), UploadPhase::Succeeded);
        assert_eq!(session.progress(), 100.0);
        assert_eq!(
            session.status_message(),
            "Файл патента успешно получен и обработан"
        );
        assert_eq!(table.len(), 1);
        assert!(session.reset_pending());

        assert!(!session.poll(&mut table, start + Duration::from_millis(1999)));
        assert!(session.selected_file().is_some());

        assert!(session.poll(&mut table, start + Duration::from_millis(2000)));
        assert_eq!(session.phase(), UploadPhase::Idle);
        assert_eq!(session.progress(), 0.0);
        assert_eq!(session.status_message(), "");
        assert!(session.selected_file().is_none());
        assert_eq!(table.row(0).unwrap().get("status"), Some("processed"));
    }

    #[test]
    fn success_without_message_uses_generic_text() {
        let transport = ManualTransport::default();
        let mut table = ResultTable::new();
        let mut session = session();
        session.select_file(SelectedFile::new("a.pdf", 10));
        session.submit(&transport).unwrap();

        transport.send(TransportEvent::Succeeded(payload(json!({"error": "Неверный PDF файл"}))));
        session.poll(&mut table, Instant::now());

        assert_eq!(session.status_message(), SUCCESS_MESSAGE);
        assert_eq!(table.row(0).unwrap().get("error"), Some("Неверный PDF файл"));
    }

    #[test]
    fn failure_records_error_row_and_persists() {
        let transport = ManualTransport::default();
        let mut table = ResultTable::new();
        let mut session = session();
        session.select_file(SelectedFile::new("b.pdf", 10));
        session.submit(&transport).unwrap();

        let start = Instant::now();
        transport.send(TransportEvent::Progress(50.0));
        transport.send(TransportEvent::Failed(TransportError {
            detail: Some("bad format".to_string()),
            message: Some("Http failure response".to_string()),
        }));
        session.poll(&mut table, start);

        assert_eq!(session.phase(), UploadPhase::Failed);
        assert_eq!(session.progress(), 0.0);
        assert_eq!(session.status_message(), "Error: bad format");
        assert!(!session.reset_pending());
        assert_eq!(table.columns(), ["fileName", "error"]);
        assert_eq!(table.row(0).unwrap().get("fileName"), Some("b.pdf"));
        assert_eq!(table.row(0).unwrap().get("error"), Some("bad format"));

        session.poll(&mut table, start + Duration::from_secs(60));
        assert_eq!(session.phase(), UploadPhase::Failed);
        assert_eq!(session.status_message(), "Error: bad format");
    }

    #[test]
    fn failure_is_tagged_with_submitted_file_not_current_selection() {
        let transport = ManualTransport::default();
        let mut table = ResultTable::new();
        let mut session = session();
        session.select_file(SelectedFile::new("first.pdf", 10));
        session.submit(&transport).unwrap();
        session.select_file(SelectedFile::new("second.pdf", 10));

        transport.send(TransportEvent::Failed(TransportError::default()));
        session.poll(&mut table, Instant::now());

        assert_eq!(table.row(0).unwrap().get("fileName"), Some("first.pdf"));
        assert_eq!(table.row(0).unwrap().get("error"), Some("Upload failed"));
    }

    #[test]
    fn dropped_worker_settles_as_failure() {
        let transport = ManualTransport::default();
        let mut table = ResultTable::new();
        let mut session = session();
        session.select_file(SelectedFile::new("a.pdf", 10));
        session.submit(&transport).unwrap();
        transport.senders.borrow_mut().clear();

        session.poll(&mut table, Instant::now());
        assert_eq!(session.phase(), UploadPhase::Failed);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn new_submission_cancels_stale_reset() {
        let transport = ManualTransport::default();
        let mut table = ResultTable::new();
        let mut session = session();
        let start = Instant::now();

        session.select_file(SelectedFile::new("a.pdf", 10));
        session.submit(&transport).unwrap();
        transport.send(TransportEvent::Succeeded(payload(json!({"message": "ok"}))));
        session.poll(&mut table, start);

        session.select_file(SelectedFile::new("b.pdf", 10));
        assert!(!session.reset_pending());
        assert_eq!(session.phase(), UploadPhase::Idle);
        session.submit(&transport).unwrap();

        session.poll(&mut table, start + Duration::from_secs(5));
        assert_eq!(session.phase(), UploadPhase::Uploading);
        assert_eq!(session.status_message(), UPLOADING_MESSAGE);
        assert_eq!(session.selected_file().map(|f| f.name.as_str()), Some("b.pdf"));
    }

    #[test]
    fn rejection_clears_selection_but_not_phase() {
        let mut session = session();
        session.select_file(SelectedFile::new("a.pdf", 10));
        session.on_file_rejected(&[RejectedFile {
            name: "huge.pdf".to_string(),
            reason: ValidationError::TooLarge { size: 10, limit: 1 },
        }]);
        assert!(session.selected_file().is_none());
        assert_eq!(session.phase(), UploadPhase::Idle);
    }
}
