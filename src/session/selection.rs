use crate::upload::SelectedFile;
use derivative::Derivative;

type Subscriber = Box<dyn FnMut(Option<&SelectedFile>)>;

/// Single-slot holder for the currently selected file.
///
/// Last write wins. Every write is pushed synchronously to all subscribers,
/// including writes that clear the slot.
#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct FileSlot {
    current: Option<SelectedFile>,
    #[derivative(Debug = "ignore")]
    subscribers: Vec<Subscriber>,
}

impl FileSlot {
    pub fn get(&self) -> Option<&SelectedFile> {
        self.current.as_ref()
    }

    pub fn set(&mut self, file: Option<SelectedFile>) {
        self.current = file;
        for subscriber in &mut self.subscribers {
            subscriber(self.current.as_ref());
        }
    }

    pub fn clear(&mut self) {
        self.set(None);
    }

    /// Registers `callback` and immediately hands it the current value.
    pub fn subscribe(&mut self, mut callback: impl FnMut(Option<&SelectedFile>) + 'static) {
        callback(self.current.as_ref());
        self.subscribers.push(Box::new(callback));
    }
}
