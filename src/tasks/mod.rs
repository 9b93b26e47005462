//! Embassy tasks module
//!
//! Task bodies for the update agent. The board binary wraps `agent_task` in
//! an `#[embassy_executor::task]` with its concrete link, transport and
//! installer types; the other tasks are started from it.

pub mod agent;
pub mod timer;
pub mod update;
pub mod version;

pub use agent::agent_task;
pub use timer::check_timer_task;
pub use update::update_task;
pub use version::version_report_task;

use crate::connection::ConnectionStatus;
use crate::coordinator::CheckTrigger;
use crate::events::EventChannel;

/// Channel between the check trigger and the update coordinator
pub static UPDATE_EVENTS: EventChannel = EventChannel::new();

/// Connection state published by the link task
pub static CONNECTION_STATUS: ConnectionStatus = ConnectionStatus::new();

/// Timer-side producer, armed by connection transitions
pub static CHECK_TRIGGER: CheckTrigger<'static> = CheckTrigger::new(&UPDATE_EVENTS);
