//! Passive file pickers for photo and QR search.
//!
//! A selection is forwarded as-is every time, so the same file can be
//! picked again right after a search.

use haat_core::search::InputChannel;

/// Which picker a file came from; both are searched by the image endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Image,
    Qr,
}

impl PickerKind {
    pub fn channel(&self) -> InputChannel {
        match self {
            Self::Image => InputChannel::Image,
            Self::Qr => InputChannel::Qr,
        }
    }
}
