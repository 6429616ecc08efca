pub mod animator;
pub mod chain;
pub mod ease;
pub mod lerp;
