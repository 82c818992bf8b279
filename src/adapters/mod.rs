// Adapters layer: concrete implementations for external systems (time-tracking service, storage).

pub mod bigtime;
pub mod storage;
