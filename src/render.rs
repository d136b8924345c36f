pub mod composite;
pub(crate) mod draw;
pub mod gate;
pub mod mockup;
pub mod shadow;
pub mod side;
pub mod surface;
