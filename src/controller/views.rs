use crate::action_framework::{FormData, Resource};

/// What the action controller needs from a concrete UI for one resource:
/// an edit form and the list it belongs to.
pub trait ResourceView<T: Resource>: Send {
    /// Fills the edit form with `record`.
    fn render(&mut self, record: &T);

    /// Current field values of the edit form.
    fn read_form(&self) -> FormData;

    fn reset_form(&mut self);

    fn reveal(&mut self);

    fn hide(&mut self);

    /// Removes the displayed row for `id`. Returns false when no such row is shown.
    fn remove_row(&mut self, id: &T::Id) -> bool;

    /// Re-renders or reloads the list.
    fn refresh(&mut self);
}

/// Synchronous yes/no question asked before destructive actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
