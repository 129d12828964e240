//! DateButton Widget Library
//!
//! A button that displays a date as its label. Tapping it opens a native
//! date-selection dialog pre-populated with the current value; confirming
//! the dialog updates the date and label and notifies a host-registered
//! callback.
//!
//! # Architecture
//!
//! The widget system is built on three pillars:
//!
//! 1. **FSM-Driven Interactions**: The widget's state machine manages its
//!    interaction states (idle, hovered, pressed, picker open). Transitions
//!    trigger visual updates, dialog presentation, and callbacks.
//!
//! 2. **Reactive Signals**: The current date and display format live in
//!    signals; the rendered label is a derived value over both, so it can
//!    never fall out of sync with the fields it is computed from.
//!
//! 3. **Injected Platform Capability**: The dialog itself is a
//!    `DatePickerHost` supplied by the embedding application, so the
//!    widget's date-mutation logic runs headless in tests.
//!
//! # Example
//!
//! ```ignore
//! use datebutton_widgets::prelude::*;
//!
//! let mut ctx = WidgetContext::new();
//!
//! let mut button = date_button()
//!     .on_date_picked(|ms| println!("picked: {ms}"))
//!     .build(&mut ctx, Box::new(my_platform_picker));
//!
//! // Feed host input; a completed tap presents the dialog
//! button.handle_event(&mut ctx, &Event::pointer(event_types::POINTER_DOWN, x, y))?;
//! button.handle_event(&mut ctx, &Event::pointer(event_types::POINTER_UP, x, y))?;
//!
//! // The host later reports the dialog outcome the same way
//! button.handle_event(&mut ctx, &Event::picker_confirmed(2024, 2, 15))?;
//!
//! // Render only when something changed
//! if ctx.is_dirty(button.id()) {
//!     let view = button.view(&mut ctx);
//!     // draw view.label with view.background ...
//! }
//! ```

pub mod context;
pub mod date_button;
pub mod format;
pub mod widget;

pub use context::{DirtyTracker, WidgetContext, WidgetState};
pub use date_button::{
    date_button, ButtonView, DateButton, DateButtonBuilder, DateButtonConfig,
};
pub use format::{datetime_from_millis, millis_at_local_midnight, DateFormat};
pub use widget::{Widget, WidgetId};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::context::WidgetContext;
    pub use crate::date_button::{date_button, DateButton, DateButtonBuilder, DateButtonConfig};
    pub use crate::format::DateFormat;
    pub use crate::widget::{Widget, WidgetId};
    pub use datebutton_core::events::{event_types, Event};
    pub use datebutton_platform::{DatePickerHost, PickerRequest};
}
