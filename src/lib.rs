pub mod config;
pub mod input;
pub mod model;
pub mod play;
pub mod record;
pub mod state;
pub mod traits;
pub mod util;

#[cfg(test)]
mod test_utils;
