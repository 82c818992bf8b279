// Domain layer: timesheet models and ports (interfaces) to the time-tracking service.

pub mod model;
pub mod ports;
