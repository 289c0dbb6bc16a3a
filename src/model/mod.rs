pub mod activity;
pub mod catalog;
pub mod employee;
pub mod lenient;
pub mod project;
pub mod schedule;
pub mod task;

pub use activity::{Activity, ActivityKind, ActivityLog};
pub use catalog::{Sector, SiteConfig, Team};
pub use employee::{Employee, People};
pub use project::{EmployeeEdit, NewTask, Project, RenameOutcome, TaskEdit, TaskFilter};
pub use schedule::DueCategory;
pub use task::{Task, TaskStatus};
