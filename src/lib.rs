pub mod dag;
pub mod debate;
pub mod errors;
pub mod linear;
pub mod model;
pub mod store;
pub mod ui;
