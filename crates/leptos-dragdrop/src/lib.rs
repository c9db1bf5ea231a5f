//! Leptos DragDrop Utilities
//!
//! Mouse-event drag and drop of cards between columns for Leptos.
//! Uses a movement threshold to distinguish click from drag.
//!
//! Document-level listeners outlive the component that binds them, so every
//! handler reads signals with `try_*` and does nothing once they are disposed.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Card being dragged and the column it came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragSource {
    pub card_id: String,
    pub column: String,
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_read: ReadSignal<Option<DragSource>>,
    pub dragging_write: WriteSignal<Option<DragSource>>,
    /// Column under the pointer while dragging
    pub drop_column_read: ReadSignal<Option<String>>,
    pub drop_column_write: WriteSignal<Option<String>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pending card (mousedown but not yet dragging)
    pub pending_read: ReadSignal<Option<DragSource>>,
    pub pending_write: WriteSignal<Option<DragSource>>,
    /// Start position for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
}

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// Has the pointer moved far enough from the mousedown point
pub fn exceeds_threshold(dx: i32, dy: i32) -> bool {
    dx.abs() > DRAG_THRESHOLD_PX || dy.abs() > DRAG_THRESHOLD_PX
}

pub fn create_dnd_signals() -> DndSignals {
    let (dragging_read, dragging_write) = signal(None::<DragSource>);
    let (drop_column_read, drop_column_write) = signal(None::<String>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_read, pending_write) = signal(None::<DragSource>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    DndSignals {
        dragging_read,
        dragging_write,
        drop_column_read,
        drop_column_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_read,
        pending_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
    }
}

impl DndSignals {
    /// Is this card the one being dragged
    pub fn is_dragging(&self, card_id: &str) -> bool {
        self.dragging_read
            .get()
            .is_some_and(|source| source.card_id == card_id)
    }

    /// Is this column the current drop target
    pub fn is_drop_column(&self, column: &str) -> bool {
        self.drop_column_read.get().as_deref() == Some(column)
    }
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.dragging_write.set(None);
    dnd.drop_column_write.set(None);
    dnd.pending_write.set(None);
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Create mousedown handler for a draggable card
/// Records pending drag with start position
pub fn make_on_card_mousedown(dnd: DndSignals, card_id: String, column: String) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() == 0 {
            // Ignore if target is input or button
            if let Some(target) = ev.target() {
                if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
                if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
            }
            dnd.pending_write.set(Some(DragSource {
                card_id: card_id.clone(),
                column: column.clone(),
            }));
            dnd.start_x_write.set(ev.client_x());
            dnd.start_y_write.set(ev.client_y());
        }
    }
}

/// Bind document mousemove - starts drag if moved enough
pub fn bind_global_mousemove(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let Some(pending) = dnd.pending_read.try_get_untracked().flatten() else { return };
        if dnd.dragging_read.try_get_untracked().flatten().is_some() {
            return;
        }
        let dx = ev.client_x() - dnd.start_x_read.get_untracked();
        let dy = ev.client_y() - dnd.start_y_read.get_untracked();
        if exceeds_threshold(dx, dy) {
            dnd.dragging_write.set(Some(pending));
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        }
    }
    on_mousemove.forget();
}

/// Create mouseenter handler for a column (becomes drop target)
pub fn make_on_column_mouseenter(dnd: DndSignals, column: String) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_read.get_untracked().is_some() {
            dnd.drop_column_write.set(Some(column.clone()));
        }
    }
}

/// Create mouseleave handler
pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_read.get_untracked().is_some() {
            dnd.drop_column_write.set(None);
        }
    }
}

/// Bind document mouseup for drop detection
///
/// `on_drop` receives the dragged card and the target column. Dropping back
/// onto the source column is reported too; callers decide what that means.
pub fn bind_global_mouseup<F>(dnd: DndSignals, on_drop: F)
where
    F: Fn(DragSource, String) + Clone + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let Some(dragging) = dnd.dragging_read.try_get_untracked() else { return };
        let drop_column = dnd.drop_column_read.get_untracked();

        // Clear pending state first
        dnd.pending_write.set(None);
        end_drag(&dnd);

        // Only a real drag over a column drops; a click just ends
        if let (Some(source), Some(column)) = (dragging, drop_column) {
            on_drop(source, column);
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
        }
    }
    on_mouseup.forget();

    // Also bind global mousemove
    bind_global_mousemove(dnd);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        assert!(!exceeds_threshold(0, 0));
        assert!(!exceeds_threshold(5, -5));
        assert!(exceeds_threshold(6, 0));
        assert!(exceeds_threshold(0, -6));
    }
}
