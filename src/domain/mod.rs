//! Domain Layer
//!
//! Entities mirrored from the Workaasana API, their status sets, and the
//! draft types used to create new records.
//! Nothing in here performs I/O.

mod entity;
mod status;
mod project;
mod task;
mod team;
mod wire;

pub use entity::{Collection, DomainError, DomainResult, Entity};
pub use status::{Badge, ProjectStatus, TaskStatus};
pub use project::{NewProject, Project};
pub use task::{NewTask, Task};
pub use team::{Member, NewMember, NewTeam, Team, TeamAvatars};
