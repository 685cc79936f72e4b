//! Generation-tagged loading flags.

use tokio::sync::watch;

/// State that tracks an in-flight request by generation.
pub(crate) trait Tracked {
    /// Generation of the most recently issued request.
    fn generation(&self) -> u64;

    /// True while the current request is in flight.
    fn is_loading(&self) -> bool;

    /// Clears the loading flag after the current request was abandoned.
    fn release(&mut self);
}

/// Clears the loading flag when dropped, unless a newer request took over.
///
/// Dropping covers success, failure and task cancellation alike.
pub(crate) struct LoadingGuard<'a, S: Tracked> {
    state: &'a watch::Sender<S>,
    generation: u64,
}

impl<'a, S: Tracked> LoadingGuard<'a, S> {
    pub(crate) fn new(state: &'a watch::Sender<S>, generation: u64) -> Self {
        Self { state, generation }
    }
}

impl<S: Tracked> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let generation = self.generation;
        self.state.send_if_modified(|s| {
            if s.generation() == generation && s.is_loading() {
                s.release();
                true
            } else {
                false
            }
        });
    }
}
