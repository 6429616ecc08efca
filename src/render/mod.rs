pub mod cpu;
pub mod record;
pub mod surface;
