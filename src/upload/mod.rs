mod transport;
mod types;
mod validator;

pub use transport::HttpTransport;
pub use types::{RejectedFile, SelectedFile, Transport, TransportError, TransportEvent};
pub use validator::FileValidator;
