pub mod audio;
pub mod time;
