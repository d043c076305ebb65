/// Generation counter for request/response pairs.
///
/// Each request takes a [`Ticket`]; only the most recently issued ticket is
/// current, so responses that arrive after a newer request (or after
/// [`RequestEpoch::invalidate`]) can be discarded.
#[derive(Debug, Clone, Default)]
pub struct RequestEpoch {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestEpoch {
    pub fn issue(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    /// Drop every outstanding ticket without issuing a new one.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }
}
