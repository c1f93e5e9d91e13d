//! Ambient particle weather around the observer.

mod field;
mod schedule;

pub use field::{MAX_CUBE_SIZE, WeatherField, WeatherFieldConfig, wrap_axis};
pub use schedule::WeatherSchedule;
