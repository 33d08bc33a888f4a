//! Error and diagnostic types of the graph
//!
//! Hard failures are [`GraphError`]s and leave the graph untouched unless a
//! variant says otherwise. Soft degradations (a reference discarded because its
//! target left the tree) are reported as [`Diagnostic`]s next to a successful
//! result.

use crate::foundation::collections::{NodeId, ResourceId};

/// Result alias used throughout the crate
pub type GraphResult<T> = Result<T, GraphError>;

/// Graph operation errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No role of the receiver accepts the item's kind
    #[error("a {parent_kind} does not accept a {item_kind} as a child (roles: {roles:?})")]
    TypeMismatch {
        /// Receiver of the attach
        parent: NodeId,
        /// Kind name of the receiver
        parent_kind: String,
        /// Rejected item
        item: NodeId,
        /// Kind name of the rejected item
        item_kind: String,
        /// Roles the receiver declares
        roles: Vec<String>,
    },

    /// The item is the receiver or one of its ancestors
    #[error("attaching {item:?} to {parent:?} would make it its own ancestor")]
    CircularAttachment {
        /// Item being moved
        item: NodeId,
        /// Receiver of the attach
        parent: NodeId,
    },

    /// A reference entry was migrated twice during one copy
    #[error("reference {slot}[{index}] of {holder:?} was migrated twice")]
    DoubleMigration {
        /// Original holder of the reference
        holder: NodeId,
        /// Reference slot name
        slot: String,
        /// Position inside the slot
        index: usize,
    },

    /// Planned reference targets were not reached by the copy walk
    #[error("copy finished with {remaining} reference targets not migrated")]
    IncompleteMigration {
        /// Targets still waiting for their copy
        remaining: usize,
    },

    /// The tree was finalized by the serializer
    #[error("cannot {operation} on {node:?}: its tree is finalized")]
    Finalized {
        /// Node the operation was attempted on
        node: NodeId,
        /// Operation name
        operation: &'static str,
    },

    /// Detach of a node that is not a child of the receiver
    #[error("{item:?} is not a child of {parent:?}")]
    NotAChild {
        /// Receiver of the detach
        parent: NodeId,
        /// Item that was not found among its children
        item: NodeId,
    },

    /// A reference target lives in a different tree than its holder
    #[error("{holder:?}.{slot} cannot reference {target:?}: they do not share a root")]
    CrossRootReference {
        /// Holder of the reference
        holder: NodeId,
        /// Reference slot name
        slot: String,
        /// Rejected target
        target: NodeId,
    },

    /// The slot does not accept the target's kind
    #[error("{slot} does not accept a {target_kind}")]
    ReferenceTypeMismatch {
        /// Reference slot name
        slot: String,
        /// Kind name of the rejected target
        target_kind: String,
    },

    /// The kind declares no such reference or resource slot
    #[error("a {kind} has no slot named {slot}")]
    UnknownSlot {
        /// Kind name
        kind: String,
        /// Requested slot
        slot: String,
    },

    /// The operation needs a node without parent
    #[error("{node:?} still has a parent")]
    NotStandalone {
        /// Offending node
        node: NodeId,
    },

    /// Stale or foreign node handle
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// No kind registered under this name
    #[error("unknown kind '{0}'")]
    UnknownKind(String),

    /// A kind with this name is already registered
    #[error("kind '{0}' is already registered")]
    DuplicateKind(String),

    /// The node's kind has no such attribute
    #[error("a {kind} has no attribute '{attribute}'")]
    UnknownAttribute {
        /// Kind name
        kind: String,
        /// Requested attribute
        attribute: String,
    },

    /// Stale or foreign resource handle
    #[error("unknown resource {0:?}")]
    UnknownResource(ResourceId),

    /// The node does not own the resource in the given slot
    #[error("{node:?} does not own a resource in slot '{slot}'")]
    NotAnOwner {
        /// Node asking for the mutation
        node: NodeId,
        /// Resource slot name
        slot: String,
    },

    /// Renaming did not reach unique names within the configured rounds
    #[error("names under {root:?} did not become unique within {rounds} rounds")]
    NamingDidNotConverge {
        /// Root whose names were being resolved
        root: NodeId,
        /// Rounds performed
        rounds: u32,
    },

    /// Attribute access on a view without members
    #[error("view '{0}' is empty")]
    EmptyView(String),

    /// Members expose the attribute differently (role, value, operation)
    #[error("members of '{view}' do not agree on what '{attribute}' is")]
    HeterogeneousAttribute {
        /// View display name
        view: String,
        /// Requested attribute
        attribute: String,
    },

    /// Per-element arguments do not match the number of elements
    #[error("expected {expected} per-element arguments, got {actual}")]
    LengthMismatch {
        /// Number of elements
        expected: usize,
        /// Number of argument sets supplied
        actual: usize,
    },

    /// Index past the end of a grid axis
    #[error("index {index} out of bounds for axis of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Axis length
        len: usize,
    },

    /// More indices than grid dimensions
    #[error("{given} indices for a grid with {dims} dimensions")]
    TooManyIndices {
        /// Indices supplied
        given: usize,
        /// Grid dimensions
        dims: usize,
    },

    /// A value does not fit the attribute or operation it was given to
    #[error("invalid value for '{attribute}': {reason}")]
    InvalidValue {
        /// Attribute or operation name
        attribute: String,
        /// What was wrong
        reason: String,
    },

    /// Lattices need a spatial template
    #[error("a {kind} has no placement and cannot be repeated in a lattice")]
    NotSpatial {
        /// Kind name of the template
        kind: String,
    },

    /// Bad lattice axes
    #[error("invalid lattice: {0}")]
    InvalidLattice(String),
}

impl GraphError {
    pub(crate) fn invalid(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

/// Soft degradations reported alongside a successful operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A copied reference pointed outside the copied region and was left empty
    DroppedReference {
        /// Holder in the source tree
        holder: NodeId,
        /// Holder in the copy
        copy: NodeId,
        /// Reference slot name
        slot: String,
        /// Target that was not copied
        target: NodeId,
    },

    /// A reference was cleared because holder and target no longer share a root
    DecoupledReference {
        /// Holder of the cleared reference
        holder: NodeId,
        /// Reference slot name
        slot: String,
        /// Former target
        target: NodeId,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DroppedReference { holder, copy, slot, target } => write!(
                f,
                "{slot} of {holder:?} targets {target:?} outside the copied region; left empty on {copy:?}"
            ),
            Self::DecoupledReference { holder, slot, target } => write!(
                f,
                "{slot} of {holder:?} no longer shares a root with {target:?}; cleared"
            ),
        }
    }
}
