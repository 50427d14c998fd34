pub mod chatdb;
pub mod db;
pub mod memory;
pub mod reviewdb;
pub mod servicedb;
pub mod userdb;
