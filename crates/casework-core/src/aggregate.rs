//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that reconstitute from event history.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the persisted version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state. Never validates: events are
    /// facts that already passed their command's precondition.
    fn apply(&mut self, event: &Self::Event);

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);

    /// Applies every uncommitted event and clears them, as if they had been
    /// persisted and reloaded.
    fn commit(&mut self)
    where
        Self::Event: Clone,
    {
        let pending = self.uncommitted_events().to_vec();
        for event in &pending {
            self.apply(event);
        }
        self.clear_uncommitted_events();
    }
}
