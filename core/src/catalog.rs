//! Static table of nudge API resources and the operations each one accepts.
//!
//! # Design
//! Resources differ only in their path segment and in which operations the
//! remote service exposes for them, so they are described as data rather than
//! as one hand-written method set per resource. The facade in
//! [`crate::client`] consults this table for every call.

use std::fmt;

/// Resource categories of the v.1.1 API.
///
/// Discriminants index into [`CATALOG`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Moves,
    Sleeps,
    Workouts,
    Meals,
    Mood,
    BodyEvents,
    CardiacEvents,
    GenericEvents,
    Friends,
    Timezone,
    Trends,
    Goals,
    Settings,
}

/// Per-item sub-resources reached through `/<segment>/<xid>/<kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubResource {
    Image,
    Snapshot,
    Ticks,
}

impl SubResource {
    pub fn as_str(self) -> &'static str {
        match self {
            SubResource::Image => "image",
            SubResource::Snapshot => "snapshot",
            SubResource::Ticks => "ticks",
        }
    }
}

/// Operations a resource may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Collection listing, or a single item when `xid` is given and the
    /// resource supports [`Operation::GetById`].
    Get,
    GetById,
    Create,
    Update,
    Delete,
    Sub(SubResource),
}

impl Operation {
    /// Parse the facade-level operation names (`get`, `create`, `update`,
    /// `delete`, `image`, `snapshot`, `ticks`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "get" => Some(Operation::Get),
            "create" => Some(Operation::Create),
            "update" => Some(Operation::Update),
            "delete" => Some(Operation::Delete),
            "image" => Some(Operation::Sub(SubResource::Image)),
            "snapshot" => Some(Operation::Sub(SubResource::Snapshot)),
            "ticks" => Some(Operation::Sub(SubResource::Ticks)),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Get | Operation::GetById => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Sub(sub) => sub.as_str(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the catalog.
#[derive(Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub resource: Resource,
    /// Facade name, e.g. `moves` or `events.body`.
    pub name: &'static str,
    /// Path segment, e.g. `moves` or `body_events`.
    pub segment: &'static str,
    pub operations: &'static [Operation],
}

use Operation::{Create, Delete, Get, GetById, Sub, Update};
use SubResource::{Image, Snapshot, Ticks};

pub static CATALOG: [Endpoint; 13] = [
    Endpoint {
        resource: Resource::Moves,
        name: "moves",
        segment: "moves",
        operations: &[Get, GetById, Sub(Image), Sub(Snapshot), Sub(Ticks)],
    },
    Endpoint {
        resource: Resource::Sleeps,
        name: "sleeps",
        segment: "sleeps",
        operations: &[Get, GetById, Create, Delete, Sub(Image), Sub(Snapshot), Sub(Ticks)],
    },
    Endpoint {
        resource: Resource::Workouts,
        name: "workouts",
        segment: "workouts",
        operations: &[
            Get,
            GetById,
            Create,
            Update,
            Delete,
            Sub(Image),
            Sub(Snapshot),
            Sub(Ticks),
        ],
    },
    Endpoint {
        resource: Resource::Meals,
        name: "meals",
        segment: "meals",
        operations: &[Get, GetById, Create, Update, Delete],
    },
    Endpoint {
        resource: Resource::Mood,
        name: "mood",
        segment: "mood",
        operations: &[Get, GetById, Create, Delete],
    },
    Endpoint {
        resource: Resource::BodyEvents,
        name: "events.body",
        segment: "body_events",
        operations: &[Get, GetById, Create, Delete],
    },
    Endpoint {
        resource: Resource::CardiacEvents,
        name: "events.cardiac",
        segment: "cardiac_events",
        operations: &[Get, GetById, Create, Delete],
    },
    Endpoint {
        resource: Resource::GenericEvents,
        name: "events.generic",
        segment: "generic_events",
        operations: &[Get, GetById, Create, Update, Delete],
    },
    Endpoint {
        resource: Resource::Friends,
        name: "friends",
        segment: "friends",
        operations: &[Get],
    },
    Endpoint {
        resource: Resource::Timezone,
        name: "timezone",
        segment: "timezone",
        operations: &[Get],
    },
    Endpoint {
        resource: Resource::Trends,
        name: "trends",
        segment: "trends",
        operations: &[Get],
    },
    Endpoint {
        resource: Resource::Goals,
        name: "goals",
        segment: "goals",
        operations: &[Get, Create],
    },
    Endpoint {
        resource: Resource::Settings,
        name: "settings",
        segment: "settings",
        operations: &[Get],
    },
];

impl Resource {
    pub const ALL: [Resource; 13] = [
        Resource::Moves,
        Resource::Sleeps,
        Resource::Workouts,
        Resource::Meals,
        Resource::Mood,
        Resource::BodyEvents,
        Resource::CardiacEvents,
        Resource::GenericEvents,
        Resource::Friends,
        Resource::Timezone,
        Resource::Trends,
        Resource::Goals,
        Resource::Settings,
    ];

    pub fn endpoint(self) -> &'static Endpoint {
        &CATALOG[self as usize]
    }

    /// Look a resource up by facade name (`moves`, `events.cardiac`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        CATALOG.iter().find(|e| e.name == name).map(|e| e.resource)
    }
}

impl Endpoint {
    pub fn supports(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    /// `/users/@me/<segment>`
    pub fn collection_path(&self) -> String {
        format!("/users/@me/{}", self.segment)
    }

    /// `/<segment>/<xid>`
    pub fn item_path(&self, xid: &str) -> String {
        format!("/{}/{}", self.segment, xid)
    }

    /// `/<segment>/<xid>/<kind>`
    pub fn sub_path(&self, xid: &str, sub: SubResource) -> String {
        format!("/{}/{}/{}", self.segment, xid, sub.as_str())
    }

    /// `/<segment>/<xid>/partialUpdate`
    pub fn update_path(&self, xid: &str) -> String {
        format!("/{}/{}/partialUpdate", self.segment, xid)
    }
}
