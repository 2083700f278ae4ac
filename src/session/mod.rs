//! Game session: state model, reducer, progression rules, scheduling.

pub mod driver;
pub mod model;
pub mod progression;
pub mod scheduler;
pub mod simulate;
pub mod summary;
pub mod update;

#[cfg(test)]
mod test_properties;
