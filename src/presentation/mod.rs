// Presentation layer - HTTP surface for the rendering client and feed pushes
pub mod app_state;
pub mod handlers;
