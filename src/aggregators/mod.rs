pub mod hourly;
pub mod weekday;

pub use hourly::{hourly_average, HourlyAverage};
pub use weekday::{weekday_average, weekday_name, WeekdayAverage, WEEKDAY_ORDER};
