pub mod control;
pub mod controls;
pub mod element;
pub mod legend;
pub mod readiness;
