use tracing::{info, warn};

pub const LEAVE_WARNING: &str =
    "You have not completed the questionnaire. Are you sure you want to leave?";

/// Page-lifecycle hooks the hosting environment provides.
///
/// The session arms the unload handler when it is created and disarms it on
/// completion or teardown. `request_confirmation` only raises the signal; whether
/// the user is actually prompted is up to the host.
pub trait PageLifecycle: Send + Sync {
    fn arm_unload(&self);
    fn disarm_unload(&self);
    fn request_confirmation(&self, message: &str);
}

/// Host with no page around it (the CLI): logs instead of prompting.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessLifecycle;

impl PageLifecycle for HeadlessLifecycle {
    fn arm_unload(&self) {
        info!("unload handler armed");
    }

    fn disarm_unload(&self) {
        info!("unload handler detached");
    }

    fn request_confirmation(&self, message: &str) {
        warn!("leave confirmation requested: {message}");
    }
}
