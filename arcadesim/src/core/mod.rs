pub mod collision;
pub mod handle_session;
pub mod hitbox;
pub mod lap;
pub mod scenery;
pub mod script;
pub mod session;
pub mod track_mask;
pub mod trail;
pub mod vehicle;
