//! The ODSS route table.
//!
//! Every REST path the API exposes is described by a [`RouteNode`]. A node
//! lists the methods valid on it, its named sub-resources, and, for
//! collections, the node reached by appending a templated member id.

use crate::clients::HttpMethod::{self, Delete, Get, Patch, Post};

/// A node in the route tree.
#[derive(Debug, PartialEq, Eq)]
pub struct RouteNode {
    /// The path segment, either a literal name or a `{param}` template.
    pub segment: &'static str,
    /// Methods valid on this node.
    pub methods: &'static [HttpMethod],
    /// Named sub-resources.
    pub children: &'static [&'static RouteNode],
    /// The member node of a collection.
    pub member: Option<&'static RouteNode>,
}

impl RouteNode {
    /// Returns `true` if `method` is valid on this node.
    #[must_use]
    pub fn allows(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }

    /// Looks up a named sub-resource.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&'static RouteNode> {
        self.children
            .iter()
            .copied()
            .find(|child| child.segment == name)
    }

    /// Returns the parameter name of a `{param}` segment.
    #[must_use]
    pub fn parameter(&self) -> Option<&'static str> {
        self.segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
    }
}

const READ_WRITE: &[HttpMethod] = &[Get, Post];
const MEMBER_FULL: &[HttpMethod] = &[Get, Patch, Delete];
const LINK: &[HttpMethod] = &[Post, Delete];
const READ: &[HttpMethod] = &[Get];

static INCIDENT_CLUE: RouteNode = leaf("{clueId}", MEMBER_FULL);
static INCIDENT_CLUES: RouteNode = collection("clues", READ_WRITE, &INCIDENT_CLUE);
static INCIDENT_PERSON: RouteNode = leaf("{personId}", MEMBER_FULL);
static INCIDENT_PERSONS: RouteNode = collection("persons", READ_WRITE, &INCIDENT_PERSON);
static INCIDENT_VEHICLE: RouteNode = leaf("{vehicleId}", MEMBER_FULL);
static INCIDENT_VEHICLES: RouteNode = collection("vehicles", READ_WRITE, &INCIDENT_VEHICLE);

static INCIDENT: RouteNode = RouteNode {
    segment: "{incidentId}",
    methods: MEMBER_FULL,
    children: &[&INCIDENT_CLUES, &INCIDENT_PERSONS, &INCIDENT_VEHICLES],
    member: None,
};
pub(crate) static INCIDENTS: RouteNode = collection("incidents", READ_WRITE, &INCIDENT);

static MISSION: RouteNode = leaf("{missionId}", MEMBER_FULL);
static MISSIONS: RouteNode = collection("missions", READ_WRITE, &MISSION);
static TRANSITIONS: RouteNode = RouteNode {
    segment: "transitions",
    methods: READ_WRITE,
    children: &[],
    member: None,
};
static OPERATION_PERSON: RouteNode = leaf("{personnelId}", LINK);
static OPERATION_PERSONNEL: RouteNode = collection("personnel", READ, &OPERATION_PERSON);
static OPERATION_TRANSPORT: RouteNode = leaf("{transportId}", LINK);
static OPERATION_TRANSPORTS: RouteNode = collection("transports", READ, &OPERATION_TRANSPORT);

static UNIT_MISSION: RouteNode = leaf("{missionId}", LINK);
static UNIT_MISSIONS: RouteNode = collection("missions", READ, &UNIT_MISSION);
static UNIT_PERSON: RouteNode = leaf("{personnelId}", LINK);
static UNIT_PERSONNEL: RouteNode = collection("personnel", READ, &UNIT_PERSON);
static UNIT_TRANSPORT: RouteNode = leaf("{transportId}", LINK);
static UNIT_TRANSPORTS: RouteNode = collection("transports", READ, &UNIT_TRANSPORT);
static UNIT: RouteNode = RouteNode {
    segment: "{unitId}",
    methods: MEMBER_FULL,
    children: &[&UNIT_MISSIONS, &UNIT_PERSONNEL, &UNIT_TRANSPORTS],
    member: None,
};
static UNITS: RouteNode = collection("units", READ_WRITE, &UNIT);

static TRACKED_UNIT: RouteNode = leaf("{unitId}", &[Get, Post, Patch, Delete]);
static TRACKING: RouteNode = collection("tracking", READ, &TRACKED_UNIT);
static AFFILIATIONS: RouteNode = RouteNode {
    segment: "affiliations",
    methods: READ,
    children: &[],
    member: None,
};

static OPERATION: RouteNode = RouteNode {
    segment: "{operationId}",
    methods: MEMBER_FULL,
    children: &[
        &MISSIONS,
        &TRANSITIONS,
        &OPERATION_PERSONNEL,
        &OPERATION_TRANSPORTS,
        &UNITS,
        &TRACKING,
        &AFFILIATIONS,
    ],
    member: None,
};
pub(crate) static OPERATIONS: RouteNode = collection("operations", READ_WRITE, &OPERATION);

static LOG: RouteNode = leaf("{logId}", READ);
pub(crate) static LOGS: RouteNode = collection("logs", READ, &LOG);
static PERSON: RouteNode = leaf("{personnelId}", READ);
pub(crate) static PERSONNEL: RouteNode = collection("personnel", READ, &PERSON);
static TRANSPORT: RouteNode = leaf("{transportId}", READ);
pub(crate) static TRANSPORTS: RouteNode = collection("transports", READ, &TRANSPORT);

/// The top-level resources.
pub static ROOTS: &[&RouteNode] = &[&INCIDENTS, &OPERATIONS, &LOGS, &PERSONNEL, &TRANSPORTS];

/// Looks up a top-level resource by name.
#[must_use]
pub fn root(name: &str) -> Option<&'static RouteNode> {
    ROOTS.iter().copied().find(|node| node.segment == name)
}

const fn leaf(segment: &'static str, methods: &'static [HttpMethod]) -> RouteNode {
    RouteNode {
        segment,
        methods,
        children: &[],
        member: None,
    }
}

const fn collection(
    segment: &'static str,
    methods: &'static [HttpMethod],
    member: &'static RouteNode,
) -> RouteNode {
    RouteNode {
        segment,
        methods,
        children: &[],
        member: Some(member),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_are_the_five_top_level_resources() {
        let names: Vec<&str> = ROOTS.iter().map(|node| node.segment).collect();
        assert_eq!(
            names,
            vec!["incidents", "operations", "logs", "personnel", "transports"]
        );
    }

    #[test]
    fn test_collection_members_are_templated() {
        let incidents = root("incidents").unwrap();
        let member = incidents.member.unwrap();
        assert_eq!(member.segment, "{incidentId}");
        assert_eq!(member.parameter(), Some("incidentId"));
        assert_eq!(incidents.parameter(), None);
    }

    #[test]
    fn test_read_only_roots() {
        for name in ["logs", "personnel", "transports"] {
            let node = root(name).unwrap();
            assert!(node.allows(HttpMethod::Get));
            assert!(!node.allows(HttpMethod::Post));
            let member = node.member.unwrap();
            assert_eq!(member.methods, &[HttpMethod::Get]);
        }
    }

    #[test]
    fn test_operation_children() {
        let operation = root("operations").unwrap().member.unwrap();
        for name in [
            "missions",
            "transitions",
            "personnel",
            "transports",
            "units",
            "tracking",
            "affiliations",
        ] {
            assert!(operation.child(name).is_some(), "missing {name}");
        }
        assert!(operation.child("clues").is_none());
    }

    #[test]
    fn test_unit_links_allow_post_and_delete_only() {
        let unit = root("operations")
            .and_then(|ops| ops.member)
            .and_then(|op| op.child("units"))
            .and_then(|units| units.member)
            .unwrap();
        let mission_link = unit.child("missions").and_then(|m| m.member).unwrap();

        assert!(mission_link.allows(HttpMethod::Post));
        assert!(mission_link.allows(HttpMethod::Delete));
        assert!(!mission_link.allows(HttpMethod::Get));
    }

    #[test]
    fn test_tracked_unit_allows_every_method() {
        let tracked = root("operations")
            .and_then(|ops| ops.member)
            .and_then(|op| op.child("tracking"))
            .and_then(|tracking| tracking.member)
            .unwrap();
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Patch, HttpMethod::Delete] {
            assert!(tracked.allows(method));
        }
    }

    #[test]
    fn test_unknown_root() {
        assert!(root("clues").is_none());
    }
}
