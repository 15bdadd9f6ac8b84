/// A one-shot teardown action (unsubscribe, cancel, ...).
pub struct Disposer {
    action: Box<dyn FnOnce() + Send>,
}

impl Disposer {
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Box::new(action),
        }
    }

    pub fn dispose(self) {
        (self.action)();
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Disposer")
    }
}

/// Collects disposers for a component and runs them all on teardown.
///
/// Dropping the scope disposes everything still registered.
#[derive(Debug, Default)]
pub struct DisposerScope {
    disposers: Vec<Disposer>,
}

impl DisposerScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, disposer: Disposer) {
        self.disposers.push(disposer);
    }

    pub fn len(&self) -> usize {
        self.disposers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disposers.is_empty()
    }

    /// Runs every registered disposer, most recent first.
    pub fn dispose(&mut self) {
        while let Some(disposer) = self.disposers.pop() {
            disposer.dispose();
        }
    }
}

impl Drop for DisposerScope {
    fn drop(&mut self) {
        self.dispose();
    }
}
