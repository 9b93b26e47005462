//! Agent startup sequence
//!
//! The link comes up first. Update services only start once the connection
//! manager has settled on `Connected`; the link keeps being driven while they
//! run so later disconnects still disarm the check trigger.

use core::future::Future;

use embassy_futures::select::{select, Either};

use crate::connection::{ConnectionManager, ConnectionState, Credentials, LinkError, WifiLink};

/// Start the station, then run `services` alongside the link loop
///
/// Returns the settled state if the link failed before services could start,
/// or `Connected` if `services` completed. Listeners must already be
/// registered on `manager`.
pub async fn run_agent<L, F>(
    manager: &mut ConnectionManager<'_, L>,
    credentials: &Credentials,
    services: F,
) -> Result<ConnectionState, LinkError>
where
    L: WifiLink,
    F: Future<Output = ()>,
{
    manager.start(credentials).await?;

    let status = manager.status();
    let gated = async {
        let state = status.wait_until_settled().await;
        if state == ConnectionState::Connected {
            log::info!("Agent: link up, starting update services");
            services.await;
        } else {
            log::error!("Agent: link {:?}, update services not started", state);
        }
        state
    };

    // The link loop does not return on its own
    match select(manager.run(), gated).await {
        Either::First(()) => Ok(status.current()),
        Either::Second(state) => Ok(state),
    }
}
