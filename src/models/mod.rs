pub mod chatmodel;
pub mod reviewmodel;
pub mod servicemodel;
pub mod usermodel;
