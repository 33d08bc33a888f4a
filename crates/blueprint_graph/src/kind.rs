//! Kind descriptors
//!
//! A kind is the per-type table the graph consults instead of reflection:
//! which roles own children, which slots hold cross-references, which fields
//! exist and what their defaults are, which fields are shared on copy, and
//! which operations can be broadcast through views.
//!
//! Kinds are declared with [`KindBuilder`] and registered on a
//! [`Graph`](crate::graph::Graph).

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::{IndexMap, IndexSet, KindId, NodeId};
use crate::foundation::math::{Quat, Vec3};
use crate::graph::Graph;
use crate::value::Value;

/// Field holding the local position of spatial kinds
pub const POSITION_FIELD: &str = "pos";

/// Field holding the local rotation of spatial kinds
pub const ROTATION_FIELD: &str = "quat";

/// Attributes every node answers to
pub const BUILTIN_ATTRIBUTES: [&str; 5] = ["name", "label", "kind", "parent", "root"];

/// Operations every node answers to
pub const BUILTIN_OPERATIONS: [&str; 4] = ["copy", "attach", "detach", "reset"];

/// Operations spatial nodes answer to
pub const SPATIAL_OPERATIONS: [&str; 2] = ["shift", "locate"];

bitflags! {
    /// What a kind is able to take part in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Owns children through roles
        const NODE = 1 << 0;
        /// Carries a local placement (`pos`, `quat`)
        const SPATIAL = 1 << 1;
        /// Holds cross-reference slots
        const REFERENCING = 1 << 2;
        /// Binds shared resources
        const RESOURCE_OWNER = 1 << 3;
    }
}

/// Which kinds a role or reference slot accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindFilter {
    /// Every kind
    Any,
    /// Exactly one kind, by name
    Kind(String),
    /// Any of the named kinds
    OneOf(Vec<String>),
    /// Every kind having all of these capabilities
    Capability(Capabilities),
}

impl KindFilter {
    /// Filter accepting a single named kind
    pub fn kind(name: impl Into<String>) -> Self {
        Self::Kind(name.into())
    }

    /// Filter accepting any of the named kinds
    pub fn one_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(names.into_iter().map(Into::into).collect())
    }

    /// Whether `kind` passes the filter
    pub fn accepts(&self, kind: &KindDescriptor) -> bool {
        match self {
            Self::Any => true,
            Self::Kind(name) => kind.name == *name,
            Self::OneOf(names) => names.iter().any(|name| kind.name == *name),
            Self::Capability(required) => kind.capabilities.contains(*required),
        }
    }
}

/// Child collection declared by a kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    /// Kinds the role accepts
    pub accepts: KindFilter,
}

/// Cross-reference slot declared by a kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSpec {
    /// Kinds the slot may point at
    pub accepts: KindFilter,
    /// Whether the slot holds several targets
    pub many: bool,
}

/// Callable exposed by a kind and broadcast through views
pub type Operation = Arc<dyn Fn(&mut Graph, NodeId, &[Value]) -> GraphResult<Value> + Send + Sync>;

/// Registered kind table
#[derive(Clone)]
pub struct KindDescriptor {
    pub(crate) id: KindId,
    pub(crate) name: String,
    pub(crate) capabilities: Capabilities,
    pub(crate) roles: IndexMap<String, RoleSpec>,
    pub(crate) references: IndexMap<String, ReferenceSpec>,
    pub(crate) defaults: IndexMap<String, Value>,
    pub(crate) resource_slots: IndexSet<String>,
    pub(crate) operations: IndexMap<String, Operation>,
}

impl KindDescriptor {
    /// Registry handle
    pub const fn id(&self) -> KindId {
        self.id
    }

    /// Kind name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capability flags
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether nodes of this kind carry a placement
    pub const fn is_spatial(&self) -> bool {
        self.capabilities.contains(Capabilities::SPATIAL)
    }

    /// Roles in declaration order
    pub const fn roles(&self) -> &IndexMap<String, RoleSpec> {
        &self.roles
    }

    /// Reference slots in declaration order
    pub const fn references(&self) -> &IndexMap<String, ReferenceSpec> {
        &self.references
    }

    /// Field defaults in declaration order
    pub const fn defaults(&self) -> &IndexMap<String, Value> {
        &self.defaults
    }

    /// Default of a field
    pub fn default_of(&self, field: &str) -> Option<&Value> {
        self.defaults.get(field)
    }

    /// Whether the field binds a shared resource, shared with copies rather than duplicated
    pub fn is_resource_slot(&self, field: &str) -> bool {
        self.resource_slots.contains(field)
    }

    /// Resource slots in declaration order
    pub fn resource_slots(&self) -> impl Iterator<Item = &str> {
        self.resource_slots.iter().map(String::as_str)
    }

    /// Whether the kind exposes an operation with this name, built-ins included
    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
            || BUILTIN_OPERATIONS.contains(&name)
            || (self.is_spatial() && SPATIAL_OPERATIONS.contains(&name))
    }

    /// User operation registered under `name`
    pub fn operation(&self, name: &str) -> Option<Operation> {
        self.operations.get(name).cloned()
    }

    /// First role, in declaration order, accepting `kind`
    pub fn accepting_role(&self, kind: &Self) -> Option<&str> {
        self.roles
            .iter()
            .find(|(_, spec)| spec.accepts.accepts(kind))
            .map(|(role, _)| role.as_str())
    }
}

impl fmt::Debug for KindDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("roles", &self.roles.keys().collect::<Vec<_>>())
            .field("references", &self.references.keys().collect::<Vec<_>>())
            .field("fields", &self.defaults.keys().collect::<Vec<_>>())
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder for kind tables
///
/// Capabilities follow from the declarations: roles imply
/// [`Capabilities::NODE`], reference slots [`Capabilities::REFERENCING`],
/// resource slots [`Capabilities::RESOURCE_OWNER`]. [`KindBuilder::spatial`]
/// adds the placement fields.
pub struct KindBuilder {
    name: String,
    capabilities: Capabilities,
    roles: IndexMap<String, RoleSpec>,
    references: IndexMap<String, ReferenceSpec>,
    defaults: IndexMap<String, Value>,
    resource_slots: IndexSet<String>,
    operations: IndexMap<String, Operation>,
    duplicates: Vec<String>,
}

impl KindBuilder {
    /// Start a kind named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Capabilities::empty(),
            roles: IndexMap::new(),
            references: IndexMap::new(),
            defaults: IndexMap::new(),
            resource_slots: IndexSet::new(),
            operations: IndexMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Give the kind a local placement
    pub fn spatial(mut self) -> Self {
        self.capabilities |= Capabilities::SPATIAL;
        self.defaults.insert(POSITION_FIELD.to_string(), Value::Vec3(Vec3::zeros()));
        self.defaults.insert(ROTATION_FIELD.to_string(), Value::Quat(Quat::identity()));
        self
    }

    /// Declare an owning role
    pub fn role(mut self, role: impl Into<String>, accepts: KindFilter) -> Self {
        let role = role.into();
        self.claim(&role);
        self.capabilities |= Capabilities::NODE;
        self.roles.insert(role, RoleSpec { accepts });
        self
    }

    /// Declare a cross-reference slot
    pub fn reference(mut self, slot: impl Into<String>, accepts: KindFilter, many: bool) -> Self {
        let slot = slot.into();
        self.claim(&slot);
        self.capabilities |= Capabilities::REFERENCING;
        self.references.insert(slot, ReferenceSpec { accepts, many });
        self
    }

    /// Declare a plain field and its default
    pub fn field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        let name = name.into();
        self.claim(&name);
        self.defaults.insert(name, default.into());
        self
    }

    /// Declare a field that binds a shared resource
    ///
    /// Copies of a node become further owners of the bound resource instead
    /// of duplicating it, unless the copy overrides the field.
    pub fn resource_slot(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.claim(&name);
        self.capabilities |= Capabilities::RESOURCE_OWNER;
        self.defaults.insert(name.clone(), Value::None);
        self.resource_slots.insert(name);
        self
    }

    /// Register an operation callable through views
    pub fn operation<F>(mut self, name: impl Into<String>, operation: F) -> Self
    where
        F: Fn(&mut Graph, NodeId, &[Value]) -> GraphResult<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        self.claim(&name);
        self.operations.insert(name, Arc::new(operation));
        self
    }

    fn claim(&mut self, name: &str) {
        let taken = self.roles.contains_key(name)
            || self.references.contains_key(name)
            || self.defaults.contains_key(name)
            || self.operations.contains_key(name)
            || BUILTIN_ATTRIBUTES.contains(&name)
            || BUILTIN_OPERATIONS.contains(&name);
        if taken {
            self.duplicates.push(name.to_string());
        }
    }

    /// Name of the kind being built
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&self) -> GraphResult<()> {
        if let Some(duplicate) = self.duplicates.first() {
            return Err(GraphError::invalid(
                duplicate.clone(),
                format!("declared twice on kind '{}'", self.name),
            ));
        }
        if let Some((field, _)) = self.defaults.iter().find(|(_, default)| default.holds_handle()) {
            return Err(GraphError::invalid(field.clone(), "a field default cannot hold a handle"));
        }
        let spatial = self.capabilities.contains(Capabilities::SPATIAL);
        if let Some(op) = self.operations.keys().find(|op| spatial && SPATIAL_OPERATIONS.contains(&op.as_str())) {
            return Err(GraphError::invalid(op.clone(), "shadows a built-in spatial operation"));
        }
        Ok(())
    }

    pub(crate) fn build(self, id: KindId) -> KindDescriptor {
        KindDescriptor {
            id,
            name: self.name,
            capabilities: self.capabilities,
            roles: self.roles,
            references: self.references,
            defaults: self.defaults,
            resource_slots: self.resource_slots,
            operations: self.operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(builder: KindBuilder) -> GraphResult<KindDescriptor> {
        builder.validate()?;
        Ok(builder.build(KindId::default()))
    }

    #[test]
    fn test_capabilities_follow_declarations() {
        let kind = build(
            KindBuilder::new("holder")
                .spatial()
                .role("items", KindFilter::Any)
                .reference("target", KindFilter::kind("holder"), false)
                .resource_slot("mesh"),
        )
        .unwrap();

        assert!(kind.capabilities().contains(
            Capabilities::NODE | Capabilities::SPATIAL | Capabilities::REFERENCING | Capabilities::RESOURCE_OWNER
        ));
        assert!(kind.is_resource_slot("mesh"));
        assert_eq!(kind.default_of(POSITION_FIELD), Some(&Value::Vec3(Vec3::zeros())));
        assert!(kind.has_operation("shift"));
        assert!(kind.has_operation("copy"));
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let result = build(KindBuilder::new("bad").field("mass", 1.0_f32).field("mass", 2.0_f32));
        assert!(matches!(result, Err(GraphError::InvalidValue { .. })));

        let result = build(KindBuilder::new("bad").field("name", "x"));
        assert!(result.is_err());
    }

    #[test]
    fn test_handle_default_rejected() {
        let result = build(KindBuilder::new("bad").field("anchor", Value::Node(NodeId::default())));
        assert!(matches!(result, Err(GraphError::InvalidValue { .. })));
    }

    #[test]
    fn test_first_accepting_role_wins() {
        let leaf = build(KindBuilder::new("leaf").spatial()).unwrap();
        let tree = build(
            KindBuilder::new("tree")
                .role("others", KindFilter::kind("stone"))
                .role("spatial", KindFilter::Capability(Capabilities::SPATIAL))
                .role("anything", KindFilter::Any),
        )
        .unwrap();

        assert_eq!(tree.accepting_role(&leaf), Some("spatial"));
        assert_eq!(tree.accepting_role(&tree), Some("anything"));
    }
}
