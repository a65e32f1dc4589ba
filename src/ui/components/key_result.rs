/// Outcome of offering a key event to an input component.
///
/// Components in overlay mode swallow most keys; anything they don't own
/// falls through to the view so list navigation keeps working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed with nothing further to do
  Handled,
  /// Consumed, and the parent must act on this event
  Event(T),
  /// Not ours; the next handler in the chain should see it
  NotHandled,
}
