// Domain layer - Pure models and rules
pub mod chart;
pub mod session;
pub mod telemetry;
pub mod validation;
