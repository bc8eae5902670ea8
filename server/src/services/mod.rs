pub mod billing;
pub mod clock;
pub mod occupancy;
pub mod tickets;

pub use clock::{Clock, FixedClock, SystemClock};
pub use occupancy::OccupancyService;
pub use tickets::{RandomTicketNumbers, TicketNumberSource, TicketService};
