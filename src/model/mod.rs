pub mod bar;
pub mod strategy;
pub mod trade;

pub use bar::{Bar, BarMatrix, Period};
pub use strategy::{IndicatorReset, IndicatorSpec, Session, Strategy};
pub use trade::{Direction, ExitReason, Trade};
