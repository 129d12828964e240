//! Widget identity

use slotmap::new_key_type;

use crate::context::WidgetContext;

new_key_type! {
    /// Unique identifier for a registered widget
    pub struct WidgetId;
}

/// Common surface shared by widgets
pub trait Widget {
    /// Get the widget ID
    fn id(&self) -> WidgetId;

    /// Check whether this widget needs re-rendering
    fn is_dirty(&self, ctx: &WidgetContext) -> bool {
        ctx.is_dirty(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(WidgetId);

    impl Widget for Fixed {
        fn id(&self) -> WidgetId {
            self.0
        }
    }

    #[test]
    fn test_default_dirty_query() {
        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget();
        let widget = Fixed(id);

        ctx.clear_dirty();
        assert!(!widget.is_dirty(&ctx));

        ctx.mark_dirty(id);
        assert!(widget.is_dirty(&ctx));
    }
}
