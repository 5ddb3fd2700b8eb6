pub mod attendance;
pub mod device;
pub mod shift;
pub mod transaction;
pub mod window;
