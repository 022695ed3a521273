pub mod common;
pub mod profile;
pub mod score;

pub use profile::{run_profile, ProfileArgs};
pub use score::{run_score, ScoreArgs};
