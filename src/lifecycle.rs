//! Destroy callbacks for shared handles.
//!
//! Parameters and configuration spaces are reference counted with [`Arc`].
//! Callbacks registered through their `on_destroy` methods run exactly once,
//! in registration order, when the last handle is dropped.
//!
//! [`Arc`]: std::sync::Arc

use core::fmt;

use parking_lot::Mutex;

type Callback = Box<dyn FnOnce() + Send>;

/// An ordered list of callbacks run when the owner is dropped.
#[derive(Default)]
pub(crate) struct DestroyCallbacks {
    callbacks: Mutex<Vec<Callback>>,
}

impl DestroyCallbacks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, callback: impl FnOnce() + Send + 'static) {
        self.callbacks.lock().push(Box::new(callback));
    }
}

impl Drop for DestroyCallbacks {
    fn drop(&mut self) {
        for callback in self.callbacks.get_mut().drain(..) {
            callback();
        }
    }
}

impl fmt::Debug for DestroyCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestroyCallbacks")
            .field("len", &self.callbacks.lock().len())
            .finish()
    }
}
