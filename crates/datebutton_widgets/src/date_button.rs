//! DateButton widget
//!
//! A button whose label is a formatted date. A completed tap presents the
//! host's date-selection dialog pre-populated with the current value;
//! confirming the dialog moves the date to local midnight on the selected
//! day, re-renders the label, and notifies the registered callback.
//!
//! The dialog outcome arrives as an event (`PICKER_CONFIRM` /
//! `PICKER_CANCEL`) fed through [`DateButton::handle_event`], the same path
//! as pointer input. While the dialog is open the widget sits in the
//! `PICKER_OPEN` state; outcome events outside that state have no
//! transition and are ignored, so a host can only deliver one outcome per
//! presentation.

use chrono::offset::Local;
use chrono::Datelike;

use datebutton_core::events::{event_types, Event, EventData};
use datebutton_core::fsm::StateMachine;
use datebutton_core::reactive::{Derived, Signal};
use datebutton_core::Color;
use datebutton_platform::{DatePickerHost, PickerRequest, Result};

use crate::context::WidgetContext;
use crate::format::{datetime_from_millis, millis_at_local_midnight, DateFormat};
use crate::widget::{Widget, WidgetId};

/// DateButton interaction states
pub mod states {
    /// Showing the label, no interaction
    pub const IDLE: u32 = 0;
    /// Pointer over the widget
    pub const HOVERED: u32 = 1;
    /// Pointer pressed down on the widget
    pub const PRESSED: u32 = 2;
    /// The date-selection dialog is active
    pub const PICKER_OPEN: u32 = 3;
}

/// DateButton configuration
#[derive(Clone)]
pub struct DateButtonConfig {
    /// Initial display format
    pub format: DateFormat,
    /// Initial date in epoch milliseconds; `None` means "now"
    pub initial_date: Option<i64>,
    /// Base background color
    pub bg_color: Color,
    /// Hover background color
    pub hover_color: Color,
    /// Pressed background color
    pub pressed_color: Color,
    /// Label text color
    pub text_color: Color,
    /// Label font size
    pub font_size: f32,
    /// Corner radius
    pub corner_radius: f32,
}

impl Default for DateButtonConfig {
    fn default() -> Self {
        Self {
            format: DateFormat::default(),
            initial_date: None,
            bg_color: Color::rgba(0.2, 0.5, 0.9, 1.0),
            hover_color: Color::rgba(0.3, 0.6, 1.0, 1.0),
            pressed_color: Color::rgba(0.15, 0.4, 0.8, 1.0),
            text_color: Color::WHITE,
            font_size: 16.0,
            corner_radius: 8.0,
        }
    }
}

impl DateButtonConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial display format
    pub fn format(mut self, format: DateFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the initial date in epoch milliseconds
    pub fn initial_date(mut self, ms: i64) -> Self {
        self.initial_date = Some(ms);
        self
    }

    /// Set the base background color
    pub fn bg_color(mut self, color: Color) -> Self {
        self.bg_color = color;
        self
    }

    /// Set the label font size
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the corner radius
    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }
}

/// Per-widget state stored in the context
struct DateButtonState {
    /// The request the dialog was seeded with, while it is open
    ///
    /// Lets a host re-present the dialog after its process was torn down
    /// underneath an open picker.
    pending_request: Option<PickerRequest>,
}

/// Resolved visual snapshot for the host to draw
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonView {
    /// Rendered label text
    pub label: String,
    /// Background for the current interaction state
    pub background: Color,
    /// Label text color
    pub text_color: Color,
    /// Label font size
    pub font_size: f32,
    /// Corner radius
    pub corner_radius: f32,
    /// Whether the dialog is active
    pub picker_open: bool,
}

/// A button that displays a date and opens a date-selection dialog on tap
pub struct DateButton {
    /// Widget ID
    id: WidgetId,
    /// Configuration
    config: DateButtonConfig,
    /// Current date in epoch milliseconds
    date_ms: Signal<i64>,
    /// Current display format
    format: Signal<DateFormat>,
    /// Rendered label, derived from date and format
    label: Derived<String>,
    /// Single-slot callback; last registration wins
    on_date_picked: Option<Box<dyn FnMut(i64) + Send>>,
    /// Injected dialog capability
    picker: Box<dyn DatePickerHost>,
}

impl DateButton {
    /// Create a new date button showing the current date
    pub fn new(ctx: &mut WidgetContext, picker: Box<dyn DatePickerHost>) -> Self {
        Self::with_config(ctx, picker, DateButtonConfig::default())
    }

    /// Create a date button with custom config
    pub fn with_config(
        ctx: &mut WidgetContext,
        picker: Box<dyn DatePickerHost>,
        config: DateButtonConfig,
    ) -> Self {
        let id = ctx.register_widget_with_fsm(Self::create_fsm());

        let initial_ms = config
            .initial_date
            .unwrap_or_else(|| Local::now().timestamp_millis());
        let date_ms = ctx.create_signal(id, initial_ms);
        let format = ctx.create_signal(id, config.format.clone());

        let label = ctx.reactive.create_derived(move |g| {
            let format = g.get(format).unwrap_or_default();
            let ms = g.get(date_ms).unwrap_or(0);
            format.render(datetime_from_millis(ms))
        });

        ctx.set_widget_state(
            id,
            DateButtonState {
                pending_request: None,
            },
        );

        Self {
            id,
            config,
            date_ms,
            format,
            label,
            on_date_picked: None,
            picker,
        }
    }

    /// Create the interaction FSM
    fn create_fsm() -> StateMachine {
        StateMachine::builder(states::IDLE)
            .on(states::IDLE, event_types::POINTER_ENTER, states::HOVERED)
            .on(states::HOVERED, event_types::POINTER_LEAVE, states::IDLE)
            .on(states::HOVERED, event_types::POINTER_DOWN, states::PRESSED)
            // Touch input has no hover phase
            .on(states::IDLE, event_types::POINTER_DOWN, states::PRESSED)
            .on(states::PRESSED, event_types::POINTER_LEAVE, states::IDLE)
            // A completed tap opens the dialog
            .on(states::PRESSED, event_types::POINTER_UP, states::PICKER_OPEN)
            .on(
                states::PICKER_OPEN,
                event_types::PICKER_CONFIRM,
                states::IDLE,
            )
            .on(
                states::PICKER_OPEN,
                event_types::PICKER_CANCEL,
                states::IDLE,
            )
            .build()
    }

    /// Get the widget ID
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Get the current date in epoch milliseconds
    pub fn date(&self, ctx: &WidgetContext) -> i64 {
        ctx.get(self.date_ms).unwrap_or_default()
    }

    /// Set the date in epoch milliseconds and re-render the label
    ///
    /// Any value is accepted; nothing is validated.
    pub fn set_date(&self, ctx: &mut WidgetContext, ms: i64) {
        ctx.set(self.date_ms, ms);
    }

    /// Get the current display format
    pub fn date_format(&self, ctx: &WidgetContext) -> DateFormat {
        ctx.get(self.format).unwrap_or_default()
    }

    /// Set the display format and re-render the label
    pub fn set_date_format(&self, ctx: &mut WidgetContext, format: DateFormat) {
        ctx.set(self.format, format);
    }

    /// Bind the callback invoked when the user confirms a date
    ///
    /// There is a single slot; binding replaces any previous callback.
    pub fn set_on_date_picked<F: FnMut(i64) + Send + 'static>(&mut self, callback: F) {
        self.on_date_picked = Some(Box::new(callback));
    }

    /// Remove the callback; confirmed selections no longer notify anyone
    pub fn clear_on_date_picked(&mut self) {
        self.on_date_picked = None;
    }

    /// Get the rendered label text
    pub fn label(&self, ctx: &mut WidgetContext) -> String {
        ctx.get_derived(self.label).unwrap_or_default()
    }

    /// Check whether the date-selection dialog is active
    pub fn is_picker_open(&self, ctx: &WidgetContext) -> bool {
        ctx.get_fsm_state(self.id) == Some(states::PICKER_OPEN)
    }

    /// Get the request the open dialog was seeded with, if any
    pub fn pending_request(&self, ctx: &WidgetContext) -> Option<PickerRequest> {
        ctx.get_widget_state::<DateButtonState>(self.id)
            .and_then(|s| s.pending_request)
    }

    /// Handle an event
    ///
    /// Pointer events drive the interaction FSM; a completed tap presents
    /// the dialog. `PICKER_CONFIRM` / `PICKER_CANCEL` events deliver the
    /// dialog outcome. A presentation failure propagates unchanged after
    /// the FSM rolls back to idle.
    pub fn handle_event(&mut self, ctx: &mut WidgetContext, event: &Event) -> Result<()> {
        let old_state = ctx.get_fsm_state(self.id).unwrap_or(states::IDLE);
        ctx.dispatch_event(self.id, event);
        let new_state = ctx.get_fsm_state(self.id).unwrap_or(states::IDLE);

        if old_state != states::PICKER_OPEN && new_state == states::PICKER_OPEN {
            return self.open_picker(ctx);
        }

        if old_state == states::PICKER_OPEN && new_state != states::PICKER_OPEN {
            if let Some(state) = ctx.get_widget_state_mut::<DateButtonState>(self.id) {
                state.pending_request = None;
            }
            if event.event_type == event_types::PICKER_CONFIRM {
                self.apply_confirmed(ctx, event);
            }
        }

        Ok(())
    }

    /// Build the button's visual snapshot
    pub fn view(&self, ctx: &mut WidgetContext) -> ButtonView {
        let fsm_state = ctx.get_fsm_state(self.id).unwrap_or(states::IDLE);

        let background = match fsm_state {
            states::HOVERED => self.config.hover_color,
            states::PRESSED => self.config.pressed_color,
            _ => self.config.bg_color,
        };

        ButtonView {
            label: self.label(ctx),
            background,
            text_color: self.config.text_color,
            font_size: self.config.font_size,
            corner_radius: self.config.corner_radius,
            picker_open: fsm_state == states::PICKER_OPEN,
        }
    }

    /// Present the dialog seeded with the current date
    fn open_picker(&mut self, ctx: &mut WidgetContext) -> Result<()> {
        let date = datetime_from_millis(self.date(ctx));
        let request = PickerRequest {
            year: date.year(),
            month0: date.month0(),
            day: date.day(),
        };

        tracing::debug!(?request, host = self.picker.name(), "presenting date picker");
        if let Err(err) = self.picker.present(request) {
            // The dialog never appeared; don't stay stuck waiting for an
            // outcome that can't arrive
            ctx.send_fsm_event(self.id, event_types::PICKER_CANCEL);
            return Err(err);
        }

        if let Some(state) = ctx.get_widget_state_mut::<DateButtonState>(self.id) {
            state.pending_request = Some(request);
        }
        Ok(())
    }

    /// Apply a confirmed selection: local midnight on the chosen day
    fn apply_confirmed(&mut self, ctx: &mut WidgetContext, event: &Event) {
        let EventData::DatePicked { year, month0, day } = event.data else {
            return;
        };

        // Time-of-day collapses to zero on every confirmation
        let Some(ms) = millis_at_local_midnight(year, month0, day) else {
            tracing::warn!(year, month0, day, "confirmed date has no local midnight");
            return;
        };

        ctx.set(self.date_ms, ms);
        if let Some(callback) = self.on_date_picked.as_mut() {
            callback(ms);
        }
    }
}

impl Widget for DateButton {
    fn id(&self) -> WidgetId {
        self.id
    }
}

/// Create a date button via the fluent builder
pub fn date_button() -> DateButtonBuilder {
    DateButtonBuilder {
        config: DateButtonConfig::default(),
        on_date_picked: None,
    }
}

/// Builder for creating date buttons
pub struct DateButtonBuilder {
    config: DateButtonConfig,
    on_date_picked: Option<Box<dyn FnMut(i64) + Send>>,
}

impl DateButtonBuilder {
    /// Set the initial date in epoch milliseconds
    pub fn date(mut self, ms: i64) -> Self {
        self.config.initial_date = Some(ms);
        self
    }

    /// Set the display format
    pub fn format(mut self, format: DateFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the base background color
    pub fn bg_color(mut self, color: Color) -> Self {
        self.config.bg_color = color;
        self
    }

    /// Set the hover background color
    pub fn hover_color(mut self, color: Color) -> Self {
        self.config.hover_color = color;
        self
    }

    /// Set the pressed background color
    pub fn pressed_color(mut self, color: Color) -> Self {
        self.config.pressed_color = color;
        self
    }

    /// Set the label text color
    pub fn text_color(mut self, color: Color) -> Self {
        self.config.text_color = color;
        self
    }

    /// Set the label font size
    pub fn font_size(mut self, size: f32) -> Self {
        self.config.font_size = size;
        self
    }

    /// Set the corner radius
    pub fn rounded(mut self, radius: f32) -> Self {
        self.config.corner_radius = radius;
        self
    }

    /// Set the date-picked callback
    pub fn on_date_picked<F: FnMut(i64) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_date_picked = Some(Box::new(callback));
        self
    }

    /// Build the widget
    pub fn build(self, ctx: &mut WidgetContext, picker: Box<dyn DatePickerHost>) -> DateButton {
        let mut button = DateButton::with_config(ctx, picker, self.config);
        button.on_date_picked = self.on_date_picked;
        button
    }
}
