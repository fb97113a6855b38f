// Panic isolation for background units
use std::any::Any;

/// Render a panic payload caught from a unit's JoinHandle
///
/// Panics carry either `&'static str` or `String`; anything else is reported generically.
pub fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
