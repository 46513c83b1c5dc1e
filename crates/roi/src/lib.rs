pub mod animator;
pub mod engine;
pub mod tween;

pub use animator::TweenDriver;
pub use engine::{compute, RoiInputs, RoiResult};
pub use tween::{RoiSnapshot, RoiTweenSet, Tween};
