use crate::api::attendance::{
    AddOffDay, AttendanceFilter, AttendanceListResponse, AttendanceRow, ConfigBody,
    LeaveMarkRequest, MarkRequest, MyAttendanceResponse, MyRecord, MySummary, OffDayInfo,
    SaveSchedule, SetDate, StartNow, WindowResponse,
};
use crate::api::department::{CreateDepartment, UpdateDepartment};
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse};
use crate::api::overview::OverviewResponse;
use crate::api::payroll::{
    CreatePayroll, PaginatedPayrollResponse, PayrollQuery, PayrollResponse, UpdatePayroll,
};
use crate::api::task::{CompleteTask, CreateTask, TaskFilter, TaskListResponse, TaskRow};
use crate::api::users::{UserListResponse, UserQuery, UserRow};
use crate::attendance::window::Phase;
use crate::model::attendance::AttendanceStatus;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveStatus, LeaveType};
use crate::model::task::TaskStatus;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StaffDesk API",
        version = "1.0.0",
        description = r#"
## StaffDesk staff management API

Backend for a staff dashboard covering attendance, leave, tasks, payroll
and the admin overview.

### Key features
- **Attendance window**
  - Admin-configured daily start time and grace period; the server
    derives whether a mark is on time or late, and honours one-off
    start overrides and off days
- **Leave requests**
  - Single-day requests with an approve/reject workflow
- **Tasks**
  - Admin-assigned work items with completion proof
- **Payroll**
  - Per-employee payroll records
- **Overview**
  - Dashboard counters; pending counts refreshed by a background poller

### Security
All routes outside `/auth` require a **JWT Bearer** token. Admin-only
operations additionally check the caller's role.
"#,
    ),
    modifiers(&SecurityAddon),
    paths(
        crate::api::attendance::get_config,
        crate::api::attendance::save_schedule,
        crate::api::attendance::start_now,
        crate::api::attendance::set_active_date,
        crate::api::attendance::add_off_day,
        crate::api::attendance::remove_off_day,
        crate::api::attendance::get_window,
        crate::api::attendance::mark,
        crate::api::attendance::mark_leave,
        crate::api::attendance::my_attendance,
        crate::api::attendance::list_attendance,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::leave_list,

        crate::api::task::create_task,
        crate::api::task::list_tasks,
        crate::api::task::my_tasks,
        crate::api::task::complete_task,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::payroll::create_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls,

        crate::api::users::list_users,
        crate::api::overview::get_overview
    ),
    components(
        schemas(
            Phase,
            AttendanceStatus,
            ConfigBody,
            SaveSchedule,
            StartNow,
            SetDate,
            AddOffDay,
            WindowResponse,
            MarkRequest,
            LeaveMarkRequest,
            MyRecord,
            MySummary,
            MyAttendanceResponse,
            AttendanceFilter,
            AttendanceRow,
            AttendanceListResponse,
            OffDayInfo,

            CreateLeave,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            LeaveType,
            LeaveStatus,

            CreateTask,
            CompleteTask,
            TaskFilter,
            TaskRow,
            TaskListResponse,
            TaskStatus,

            CreateEmployee,
            Employee,
            EmployeeListResponse,

            Department,
            CreateDepartment,
            UpdateDepartment,

            CreatePayroll,
            UpdatePayroll,
            PayrollResponse,
            PaginatedPayrollResponse,
            PayrollQuery,

            UserQuery,
            UserRow,
            UserListResponse,
            OverviewResponse
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance window and marking APIs"),
        (name = "Leave", description = "Leave request APIs"),
        (name = "Task", description = "Task assignment APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Users", description = "User account APIs"),
        (name = "Overview", description = "Admin overview APIs"),
    )
)]
pub struct ApiDoc;
