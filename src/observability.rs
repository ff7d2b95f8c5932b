use biometrics::{Collector, Counter, Moments};

pub(crate) static GATEWAY_REQUESTS: Counter = Counter::new("edulingo.gateway.requests");
pub(crate) static GATEWAY_REQUEST_ERRORS: Counter = Counter::new("edulingo.gateway.request_errors");
pub(crate) static GATEWAY_REQUEST_DURATION: Moments =
    Moments::new("edulingo.gateway.request_duration_seconds");

pub(crate) static STORE_LOADS: Counter = Counter::new("edulingo.store.loads");
pub(crate) static STORE_LOAD_ERRORS: Counter = Counter::new("edulingo.store.load_errors");
pub(crate) static STORE_SAVES: Counter = Counter::new("edulingo.store.saves");
pub(crate) static STORE_SAVE_ERRORS: Counter = Counter::new("edulingo.store.save_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&GATEWAY_REQUESTS);
    collector.register_counter(&GATEWAY_REQUEST_ERRORS);
    collector.register_moments(&GATEWAY_REQUEST_DURATION);

    collector.register_counter(&STORE_LOADS);
    collector.register_counter(&STORE_LOAD_ERRORS);
    collector.register_counter(&STORE_SAVES);
    collector.register_counter(&STORE_SAVE_ERRORS);
}
