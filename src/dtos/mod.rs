pub mod chatdtos;
pub mod servicedtos;
