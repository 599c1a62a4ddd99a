pub mod attendance;
pub mod department;
pub mod employee;
pub mod leave_request;
pub mod overview;
pub mod payroll;
pub mod task;
pub mod users;
