#![allow(dead_code)]

use aero_core::{BoxError, Event, Params};
use std::sync::{Arc, Mutex};

// ============================================================================
// Order tracking
// ============================================================================

pub type Order = Arc<Mutex<Vec<&'static str>>>;

pub fn order() -> Order {
    Arc::new(Mutex::new(Vec::new()))
}

/// A closure listener that appends `tag` to `order` and returns it.
pub fn tagged(
    order: &Order,
    tag: &'static str,
) -> impl Fn(&mut Event<Params>) -> Result<&'static str, BoxError> + Send + Sync + 'static {
    let order = Arc::clone(order);
    move |_| {
        order.lock().unwrap().push(tag);
        Ok(tag)
    }
}

pub fn recorded(order: &Order) -> Vec<&'static str> {
    order.lock().unwrap().clone()
}
