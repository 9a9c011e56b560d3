//! Prioritized action batches.

/// A named, prioritized batch of homogeneous values.
///
/// One `Action` exists per declared section of the action file. The engine
/// sorts actions across categories by `priority`; the `values` of a single
/// action keep their declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action<T> {
    pub priority: i32,
    pub name: String,
    pub values: Vec<T>,
}

impl<T> Action<T> {
    pub fn new(priority: i32, name: impl Into<String>, values: Vec<T>) -> Self {
        Self {
            priority,
            name: name.into(),
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
