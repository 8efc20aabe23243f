pub mod events;
pub mod reporter;
