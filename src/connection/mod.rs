pub mod manager;
pub mod traits;

pub use manager::{
    ConnectionManager, ConnectionState, ConnectionStatus, ListenerTableFull, Transition,
    TransitionListener,
};
pub use traits::{Credentials, LinkError, LinkEvent, WifiLink};
