//! Live position lookup.
//!
//! The terminal has no GPS, so [`IpGeolocation`] asks an IP geolocation
//! service (IpApi) where the host is. Failures are reported to the event
//! loop as [`Event::LocationError`]; nothing else waits on this lookup.

use crate::events::Event;
use crate::models::LatLng;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use ipgeolocate::{Locator, Service};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{error, info};

pub trait GeolocationSource: Send + Sync + 'static {
    fn locate(&self) -> impl Future<Output = Result<LatLng>> + Send;
}

pub struct IpGeolocation {
    ip: String,
}

impl IpGeolocation {
    /// `ip` may be empty to locate the address the request comes from.
    pub fn new(ip: impl Into<String>) -> Self {
        Self { ip: ip.into() }
    }
}

impl GeolocationSource for IpGeolocation {
    async fn locate(&self) -> Result<LatLng> {
        // Using IpApi as the service, it's pretty reliable.
        let loc = Locator::get(&self.ip, Service::IpApi)
            .await
            .map_err(|e| eyre!("geolocation service failed: {}", e))?;

        let lat = loc.latitude.parse::<f64>()?;
        let lng = loc.longitude.parse::<f64>()?;
        Ok(LatLng::new(lat, lng))
    }
}

/// Resolves the live position once in the background.
pub fn spawn_locate<G: GeolocationSource>(source: G, tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        let event = match source.locate().await {
            Ok(position) => {
                info!("Geolocation successful - ({}, {})", position.lat, position.lng);
                Event::LocationFound(position)
            }
            Err(e) => {
                error!("Error using geolocation service: {}", e);
                Event::LocationError(e.to_string())
            }
        };
        tx.send(event).ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<LatLng>);

    impl GeolocationSource for Fixed {
        async fn locate(&self) -> Result<LatLng> {
            self.0.ok_or_else(|| eyre!("User denied geolocation"))
        }
    }

    #[tokio::test]
    async fn posts_found_position() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_locate(Fixed(Some(LatLng::new(1.3, 103.8))), tx);

        match rx.recv().await {
            Some(Event::LocationFound(p)) => assert_eq!(p, LatLng::new(1.3, 103.8)),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn posts_error_on_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_locate(Fixed(None), tx);

        match rx.recv().await {
            Some(Event::LocationError(reason)) => assert!(reason.contains("denied")),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
