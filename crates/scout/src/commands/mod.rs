pub mod discover;
pub mod init;
