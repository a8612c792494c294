//! Minimal observable state holder for host bindings.
//!
//! Hosts register listeners and are notified synchronously after each
//! mutation. This stands in for framework-specific reactive property
//! wrappers: an explicit event emitter, nothing more.

#[cfg(test)]
#[path = "signal_test.rs"]
mod signal_test;

type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// A value plus the listeners observing it.
pub struct Signal<T> {
    value: T,
    listeners: Vec<Listener<T>>,
}

impl<T> Signal<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { value, listeners: Vec::new() }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutate the value in place, then notify every listener synchronously.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        for listener in &mut self.listeners {
            listener(&self.value);
        }
    }

    /// Replace the value, then notify.
    pub fn set(&mut self, value: T) {
        self.update(move |v| *v = value);
    }

    /// Register a listener. It is called immediately with the current value
    /// so the subscriber starts from a known state.
    pub fn subscribe(&mut self, mut f: impl FnMut(&T) + Send + 'static) {
        f(&self.value);
        self.listeners.push(Box::new(f));
    }
}

impl<T: Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
