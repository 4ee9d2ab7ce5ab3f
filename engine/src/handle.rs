use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Mutex, PoisonError},
};
use tokio::task::JoinHandle;

enum Teardown {
    Task(JoinHandle<()>),
    Callback(Box<dyn FnOnce() + Send>),
    Group(Vec<SubscriptionHandle>),
}

/// Teardown of one subscription or of a group of them.
///
/// `unsubscribe` runs the teardown at most once, later calls do nothing.
/// Dropping the handle unsubscribes as well.
#[must_use = "dropping a SubscriptionHandle tears the subscription down"]
pub struct SubscriptionHandle {
    teardown: Mutex<Option<Teardown>>,
}

impl SubscriptionHandle {
    fn with(teardown: Option<Teardown>) -> Self {
        Self {
            teardown: Mutex::new(teardown),
        }
    }

    /// Handle with nothing to tear down.
    pub fn noop() -> Self {
        Self::with(None)
    }

    /// Aborts the task on teardown. Nothing waits for the task to finish.
    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self::with(Some(Teardown::Task(task)))
    }

    pub fn from_fn<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::with(Some(Teardown::Callback(Box::new(teardown))))
    }

    pub fn composite(handles: Vec<SubscriptionHandle>) -> Self {
        Self::with(Some(Teardown::Group(handles)))
    }

    pub fn is_active(&self) -> bool {
        self.teardown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn unsubscribe(&self) {
        let teardown = self
            .teardown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match teardown {
            None => {}
            Some(Teardown::Task(task)) => task.abort(),
            Some(Teardown::Callback(callback)) => {
                if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
                    log::warn!("subscription teardown panicked");
                }
            }
            Some(Teardown::Group(handles)) => {
                for handle in handles.iter() {
                    handle.unsubscribe();
                }
            }
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.is_active())
            .finish()
    }
}
