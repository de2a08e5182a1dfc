//! Request stamps for discarding superseded responses.

/// Ticket issued to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

/// Monotonic stamp source; only the newest ticket is current.
///
/// # Examples
/// ```
/// use selfmap_client::domain::RequestStamps;
///
/// let mut stamps = RequestStamps::default();
/// let first = stamps.issue();
/// let second = stamps.issue();
/// assert!(!stamps.is_current(first));
/// assert!(stamps.is_current(second));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestStamps {
    latest: u64,
}

impl RequestStamps {
    /// Issue a ticket that supersedes every earlier one.
    pub fn issue(&mut self) -> RequestTicket {
        self.latest = self.latest.saturating_add(1);
        RequestTicket(self.latest)
    }

    /// Whether `ticket` is the newest issued.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }
}
