pub mod channel;

pub use channel::{CheckSource, EventChannel, UpdateEvent};
