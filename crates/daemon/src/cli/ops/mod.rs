pub mod daemon;
pub mod get;
pub mod health;
pub mod init;
pub mod put;
pub mod version;

pub use daemon::Daemon;
pub use get::Get;
pub use health::Health;
pub use init::Init;
pub use put::Put;
pub use version::Version;
