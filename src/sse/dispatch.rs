//! Routing parsed events to presentation callbacks.

use crate::sse::events::{event_types, ParsedSseEvent};

type Handler<'a> = Box<dyn FnMut(&ParsedSseEvent) + Send + 'a>;

/// Named callback slots for [`dispatch`].
///
/// Unset slots swallow the event.
///
/// # Example
///
/// ```ignore
/// let mut handlers = SseEventHandlers::new()
///     .on_success(|event| render(event))
///     .on_parse_error(|event| show_error(event.error()));
/// for event in parse_sse_stream(&body, None) {
///     dispatch(&event, &mut handlers);
/// }
/// ```
#[derive(Default)]
pub struct SseEventHandlers<'a> {
    success: Option<Handler<'a>>,
    tool_blocked: Option<Handler<'a>>,
    tool_error: Option<Handler<'a>>,
    parse_error: Option<Handler<'a>>,
    validation_error: Option<Handler<'a>>,
}

impl<'a> SseEventHandlers<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl FnMut(&ParsedSseEvent) + Send + 'a) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    pub fn on_tool_blocked(mut self, f: impl FnMut(&ParsedSseEvent) + Send + 'a) -> Self {
        self.tool_blocked = Some(Box::new(f));
        self
    }

    pub fn on_tool_error(mut self, f: impl FnMut(&ParsedSseEvent) + Send + 'a) -> Self {
        self.tool_error = Some(Box::new(f));
        self
    }

    pub fn on_parse_error(mut self, f: impl FnMut(&ParsedSseEvent) + Send + 'a) -> Self {
        self.parse_error = Some(Box::new(f));
        self
    }

    pub fn on_validation_error(mut self, f: impl FnMut(&ParsedSseEvent) + Send + 'a) -> Self {
        self.validation_error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for SseEventHandlers<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseEventHandlers")
            .field("success", &self.success.is_some())
            .field("tool_blocked", &self.tool_blocked.is_some())
            .field("tool_error", &self.tool_error.is_some())
            .field("parse_error", &self.parse_error.is_some())
            .field("validation_error", &self.validation_error.is_some())
            .finish()
    }
}

/// Route an event to at most one handler.
///
/// Failed parses always go to the parse-error slot, whatever their type.
pub fn dispatch(event: &ParsedSseEvent, handlers: &mut SseEventHandlers<'_>) {
    let slot = if !event.is_success() {
        &mut handlers.parse_error
    } else {
        match event.event_type.as_str() {
            event_types::TOOL_BLOCKED => &mut handlers.tool_blocked,
            event_types::TOOL_ERROR => &mut handlers.tool_error,
            event_types::PARSE_ERROR => &mut handlers.parse_error,
            event_types::VALIDATION_ERROR => &mut handlers.validation_error,
            _ => &mut handlers.success,
        }
    };

    match slot {
        Some(handler) => handler(event),
        None => tracing::trace!(event_type = %event.event_type, "no handler for event"),
    }
}
