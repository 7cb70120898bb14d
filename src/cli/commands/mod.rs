mod init;
mod serve;
mod set_role;
mod superuser;

pub use init::cmd_init;
pub use serve::cmd_serve;
pub use set_role::cmd_set_role;
pub use superuser::cmd_create_superuser;
