pub mod init;
pub mod score;
pub mod serve;
pub mod similarity;
