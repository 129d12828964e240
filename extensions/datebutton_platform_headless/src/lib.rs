//! Headless date-picker host
//!
//! A [`DatePickerHost`] that presents nothing. Each presentation is recorded
//! in a shared log the host (or a test) can inspect, and the outcome is fed
//! back to the widget by the caller as a confirm/cancel event — the same
//! contract a native dialog follows, minus the UI.
//!
//! # Example
//!
//! ```ignore
//! let picker = HeadlessPicker::new();
//! let log = picker.request_log();
//!
//! let mut button = DateButton::new(&mut ctx, Box::new(picker));
//! // ... tap the button ...
//! assert_eq!(log.requests().len(), 1);
//! button.handle_event(&mut ctx, &Event::picker_confirmed(2024, 2, 15))?;
//! ```

use std::sync::{Arc, Mutex};

use datebutton_platform::{DatePickerHost, PickerRequest, PlatformError, Result};

/// Shared, inspectable log of presentation requests
#[derive(Clone, Default)]
pub struct PickerLog {
    requests: Arc<Mutex<Vec<PickerRequest>>>,
}

impl PickerLog {
    /// All requests presented so far, in order
    pub fn requests(&self) -> Vec<PickerRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request, if any
    pub fn last(&self) -> Option<PickerRequest> {
        self.requests.lock().unwrap().last().copied()
    }

    fn push(&self, request: PickerRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

/// A `DatePickerHost` with no UI
pub struct HeadlessPicker {
    log: PickerLog,
    failure: Option<String>,
}

impl HeadlessPicker {
    /// Create a headless picker that accepts every presentation
    pub fn new() -> Self {
        Self {
            log: PickerLog::default(),
            failure: None,
        }
    }

    /// Create a headless picker whose presentations fail with `message`
    ///
    /// Lets tests exercise the widget's handling of a dialog that cannot be
    /// constructed.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            log: PickerLog::default(),
            failure: Some(message.into()),
        }
    }

    /// Get a handle to the presentation log
    ///
    /// The handle stays valid after the picker is boxed and moved into a
    /// widget.
    pub fn request_log(&self) -> PickerLog {
        self.log.clone()
    }
}

impl Default for HeadlessPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl DatePickerHost for HeadlessPicker {
    fn present(&mut self, request: PickerRequest) -> Result<()> {
        if let Some(ref message) = self.failure {
            return Err(PlatformError::DialogPresentation(message.clone()));
        }
        self.log.push(request);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_requests() {
        let mut picker = HeadlessPicker::new();
        let log = picker.request_log();

        let request = PickerRequest {
            year: 2024,
            month0: 2,
            day: 15,
        };
        picker.present(request).unwrap();

        assert_eq!(log.requests(), vec![request]);
        assert_eq!(log.last(), Some(request));
    }

    #[test]
    fn test_failing_presentation() {
        let mut picker = HeadlessPicker::failing("no display");
        let log = picker.request_log();

        let result = picker.present(PickerRequest {
            year: 2024,
            month0: 0,
            day: 1,
        });

        assert!(matches!(result, Err(PlatformError::DialogPresentation(_))));
        assert!(log.requests().is_empty());
    }
}
