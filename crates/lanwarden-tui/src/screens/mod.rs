//! Screen implementations. Each screen is a top-level Component.

use std::sync::Arc;

use lanwarden_core::BusySet;

use crate::component::Component;
use crate::screen::ScreenId;

mod devices;
mod login;
mod scans;

pub use devices::DevicesScreen;
pub use login::LoginScreen;
pub use scans::ScansScreen;

/// Create all screens keyed by their ScreenId.
pub fn create_screens(busy: Arc<BusySet>) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Login, Box::new(LoginScreen::new()) as Box<dyn Component>),
        (ScreenId::Devices, Box::new(DevicesScreen::new(busy.clone()))),
        (ScreenId::Scans, Box::new(ScansScreen::new(busy))),
    ]
}
