pub use super::boss_rule::Entity as BossRule;
pub use super::points_archive::Entity as PointsArchive;
pub use super::points_archive_entry::Entity as PointsArchiveEntry;
pub use super::sequence::Entity as Sequence;
pub use super::ticket::Entity as Ticket;
pub use super::ticket_claimer::Entity as TicketClaimer;
pub use super::ticket_type_boss::Entity as TicketTypeBoss;
pub use super::user_account::Entity as UserAccount;
