pub mod fleet_schedule;
pub mod request;
pub mod stop;
pub mod timetable;
pub mod vehicle;
