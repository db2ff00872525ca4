mod changelog;
mod device;
mod team;

pub use self::changelog::*;
pub use self::device::*;
pub use self::team::*;
