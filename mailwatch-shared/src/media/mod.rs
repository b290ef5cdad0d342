/// Media utilities
///
/// # Modules
///
/// - [`avatar`]: decode, bounded resize, and PNG re-encode of profile images
/// - [`gravatar`]: Gravatar URL construction for a primary email address
/// - [`qr`]: QR code rendering to PNG
/// - [`store`]: on-disk avatar file storage under the media root

pub mod avatar;
pub mod gravatar;
pub mod qr;
pub mod store;
