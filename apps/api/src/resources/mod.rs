// Generic CRUD for the three user-published resources: activities, jobs and
// formations. They share one row shape and one set of handlers; the concrete
// table is picked by the `ResourceKind` attached to each sub-router.

pub mod handlers;
pub mod query;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Activity,
    Job,
    Formation,
}

impl ResourceKind {
    /// Table name; fixed per variant, never taken from user input.
    pub fn table(self) -> &'static str {
        match self {
            ResourceKind::Activity => "activities",
            ResourceKind::Job => "jobs",
            ResourceKind::Formation => "formations",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Activity => "Activity",
            ResourceKind::Job => "Job",
            ResourceKind::Formation => "Formation",
        }
    }
}
