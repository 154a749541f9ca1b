pub mod orchestration;

pub use orchestration::{dispatch, Services};
