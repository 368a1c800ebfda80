pub mod check;
pub mod init;
pub mod record;
pub mod validate;
