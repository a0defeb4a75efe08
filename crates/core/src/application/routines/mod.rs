pub mod backup_routine;
pub mod merge_routine;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Names the CLI accepts for `run-routine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RoutineKind {
    Backup,
    Merge,
}
