//! The date-picker dialog capability

use crate::error::Result;

/// Initial selection handed to the dialog
///
/// `month0` is zero-indexed (0 = January), matching the native dialog
/// convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickerRequest {
    pub year: i32,
    pub month0: u32,
    pub day: u32,
}

/// Host-provided modal date-selection dialog
///
/// Implementations present a platform UI pre-populated with the request and
/// must eventually deliver exactly one outcome per presentation — a
/// `PICKER_CONFIRM` event carrying the selected (year, month0, day), or a
/// `PICKER_CANCEL` event — back to the widget that asked. The dialog's
/// modality is the host's concern; this trait only starts the interaction.
///
/// Presentation failures (a dialog that cannot be constructed) are returned
/// from [`present`](DatePickerHost::present) and propagate to the host
/// unchanged; the widget does not retry.
pub trait DatePickerHost: Send {
    /// Present the dialog seeded with `request`
    fn present(&mut self, request: PickerRequest) -> Result<()>;

    /// Get the host name, e.g. "headless" or "android"
    fn name(&self) -> &'static str {
        "unknown"
    }
}
