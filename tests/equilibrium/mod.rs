pub mod fixtures;

mod multi_period;
mod single_period;
