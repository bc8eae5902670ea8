pub mod activity;
pub mod garage;
pub mod money;
pub mod ticket;

pub use activity::{ActivityResponse, ActivitySummary};
pub use garage::{GarageDefaults, GarageSetting, GarageStats, GarageStatsResponse};
pub use money::Money;
pub use ticket::{
    CreateTicketRequest, ExitTicketRequest, NewTicket, Ticket, TicketExit, TicketNumber,
    TicketResponse, TicketStatus,
};
