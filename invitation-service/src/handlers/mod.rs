pub mod auth_handlers;
pub mod invitation_handlers;
pub mod scan_handlers;
pub mod user_handlers;
pub mod verify_handlers;
