//! Opaque window handle table
//!
//! Public protocol identifiers are never registry-native ids: the table
//! issues small monotonically increasing handles and invalidates them when
//! the window is destroyed. Handles are never reused, so a command sent
//! against a window that died (even if its native id was recycled) fails
//! to resolve instead of hitting the wrong window.

use std::collections::HashMap;

use sill_ipc::WindowHandle;

use crate::registry::WindowId;

#[derive(Debug)]
pub(crate) struct HandleTable {
    next: u64,
    by_handle: HashMap<WindowHandle, WindowId>,
    by_window: HashMap<WindowId, WindowHandle>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            next: 1,
            by_handle: HashMap::new(),
            by_window: HashMap::new(),
        }
    }

    /// Handle for `id`, issuing a fresh one the first time the window is seen.
    pub fn issue(&mut self, id: WindowId) -> WindowHandle {
        if let Some(&handle) = self.by_window.get(&id) {
            return handle;
        }
        let handle = WindowHandle(self.next);
        self.next += 1;
        self.by_handle.insert(handle, id);
        self.by_window.insert(id, handle);
        handle
    }

    /// Resolve a wire handle to the window it names, if it still exists.
    pub fn resolve(&self, handle: WindowHandle) -> Option<WindowId> {
        self.by_handle.get(&handle).copied()
    }

    /// Drop the handle for a destroyed window.
    pub fn invalidate(&mut self, id: WindowId) {
        if let Some(handle) = self.by_window.remove(&id) {
            self.by_handle.remove(&handle);
        }
    }
}
