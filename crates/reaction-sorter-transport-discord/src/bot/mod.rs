/// Flood protection for "permission required" replies
pub mod denial_cache;
/// Gateway event handler
pub mod handler;
/// `ChatPlatform` implementation over the serenity HTTP client
pub mod platform;
/// Channel purge planning
pub mod purge;

pub use denial_cache::PermissionDenialCache;
pub use handler::Handler;
pub use platform::SerenityPlatform;
