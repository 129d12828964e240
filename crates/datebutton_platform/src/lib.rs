//! DateButton Platform Abstraction
//!
//! This crate provides the platform-agnostic contract for the one native
//! capability the DateButton widget consumes: a modal date-selection dialog.
//!
//! # Architecture
//!
//! The widget never talks to a toolkit directly. It asks a
//! [`DatePickerHost`] to present a dialog seeded with an initial
//! (year, month0, day), and the host later feeds the outcome back to the
//! widget as an event — exactly one of confirm or cancel per presentation.
//!
//! # Platform Implementations
//!
//! - `datebutton_platform_headless` - records presentations, for tests and
//!   hosts without a native dialog
//! - toolkit-specific hosts live with the embedding application
//!
//! # Example
//!
//! ```ignore
//! use datebutton_platform::{DatePickerHost, PickerRequest, Result};
//!
//! struct MyToolkitPicker { /* window handle, ... */ }
//!
//! impl DatePickerHost for MyToolkitPicker {
//!     fn present(&mut self, request: PickerRequest) -> Result<()> {
//!         // open the toolkit's date dialog at request.year/month0/day;
//!         // on close, feed Event::picker_confirmed(..) or
//!         // Event::picker_cancelled() back to the widget
//!         Ok(())
//!     }
//! }
//! ```

mod error;
mod picker;

pub use error::{PlatformError, Result};
pub use picker::{DatePickerHost, PickerRequest};
