//! Remote procedures bound to method nodes.
//!
//! A [`MethodDescriptor`] owns one [`Procedure`] and the call slot for it.
//! A call goes through `bind`, then `execute`, under the descriptor's lock:
//!
//! ```text
//! Idle --bind--> Bound --execute--> Executed
//!   ^              |                   |
//!   +---failure----+                   +--bind--> Bound
//! ```
//!
//! Arguments are checked against the schema before the procedure runs, so a
//! rejected call never reaches the store.

mod change_acl;
mod change_owner;
mod create_block;
mod create_memory;
mod delete_block;
mod delete_memory;
mod search_block;

use std::sync::{Mutex, MutexGuard};

use crate::attributes::{FieldSpec, NodeDescriptor};
use crate::error::BridgeError;
use crate::manager::UserIdentity;
use crate::node_id::{ids, NodeId};
use crate::reference::{Reference, ReferenceBuilder};
use crate::variant::{Argument, DataValue, StatusCode, Variant};

pub use change_acl::ChangeAcl;
pub use change_owner::ChangeOwner;
pub use create_block::CreateBlock;
pub use create_memory::CreateMemory;
pub use delete_block::DeleteBlock;
pub use delete_memory::DeleteMemory;
pub use search_block::SearchBlock;

pub const INPUT_ARGUMENTS: &str = "InputArguments";
pub const OUTPUT_ARGUMENTS: &str = "OutputArguments";

/// One store operation exposed as a method.
pub trait Procedure: Send + Sync {
    /// Browse name of the method node.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn input_arguments(&self) -> Vec<Argument>;

    fn output_arguments(&self) -> Vec<Argument> {
        Vec::new()
    }

    /// Perform the operation. `call` has already passed the schema check.
    fn run(&self, call: &BoundCall) -> Result<Option<Vec<Variant>>, BridgeError>;
}

/// Arguments and caller of the call being executed.
#[derive(Debug, Clone)]
pub struct BoundCall {
    pub args: Vec<Variant>,
    pub caller: UserIdentity,
}

impl BoundCall {
    pub fn new(args: Vec<Variant>, caller: UserIdentity) -> Self {
        Self { args, caller }
    }

    /// Scalar string argument; `Empty` reads as "".
    pub fn string(&self, index: usize) -> &str {
        match self.args.get(index) {
            Some(Variant::String(s)) => s,
            _ => "",
        }
    }

    /// String array argument; anything else reads as empty.
    pub fn strings(&self, index: usize) -> &[String] {
        match self.args.get(index) {
            Some(Variant::StringArray(v)) => v,
            _ => &[],
        }
    }
}

/// Check `args` against `schema`: arity first, then type and shape.
pub fn validate(schema: &[Argument], args: &[Variant]) -> Result<(), BridgeError> {
    if args.len() < schema.len() {
        return Err(BridgeError::argument(
            StatusCode::BadArgumentsMissing,
            format!("expected {} arguments, got {}", schema.len(), args.len()),
        ));
    }
    if args.len() > schema.len() {
        return Err(BridgeError::argument(
            StatusCode::BadTooManyArguments,
            format!("expected {} arguments, got {}", schema.len(), args.len()),
        ));
    }
    for (argument, value) in schema.iter().zip(args) {
        let fits = match (argument.is_array(), value) {
            (false, Variant::String(_) | Variant::Empty) => true,
            (true, Variant::StringArray(items)) => match argument.array_dimensions.first() {
                Some(&len) if len > 0 => items.len() == len as usize,
                _ => true,
            },
            (true, Variant::Empty) => argument.array_dimensions.is_empty(),
            _ => false,
        };
        if !fits {
            return Err(BridgeError::argument(
                StatusCode::BadTypeMismatch,
                format!("argument {} has the wrong type or length", argument.name),
            ));
        }
    }
    Ok(())
}

/// Where a descriptor is in its call cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    Bound,
    Executed,
}

#[derive(Debug)]
enum CallState {
    Idle,
    Bound(BoundCall),
    Executed(Option<Vec<Variant>>),
}

/// A procedure bound to a method node.
pub struct MethodDescriptor {
    node_id: NodeId,
    procedure: Box<dyn Procedure>,
    inputs: Vec<Argument>,
    outputs: Vec<Argument>,
    slot: Mutex<CallState>,
}

impl MethodDescriptor {
    pub fn new(namespace: u16, procedure: impl Procedure + 'static) -> Self {
        let inputs = procedure.input_arguments();
        let outputs = procedure.output_arguments();
        Self {
            node_id: NodeId::string(namespace, procedure.name()),
            procedure: Box::new(procedure),
            inputs,
            outputs,
            slot: Mutex::new(CallState::Idle),
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn name(&self) -> &'static str {
        self.procedure.name()
    }

    pub fn input_arguments(&self) -> &[Argument] {
        &self.inputs
    }

    pub fn output_arguments(&self) -> &[Argument] {
        &self.outputs
    }

    /// Take the call slot. Other callers wait until the guard is dropped.
    pub fn lock(&self) -> CallGuard<'_> {
        CallGuard {
            descriptor: self,
            state: self.slot.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }

    /// Bind and execute in one step.
    pub fn invoke(
        &self,
        args: Vec<Variant>,
        caller: UserIdentity,
    ) -> Result<Option<Vec<Variant>>, BridgeError> {
        let mut guard = self.lock();
        guard.bind(args, caller);
        guard.execute_with_output()
    }

    pub fn phase(&self) -> CallPhase {
        self.lock().phase()
    }

    fn argument_node_name(&self, kind: &str) -> String {
        format!("{}/{}", self.name(), kind)
    }

    fn argument_nodes(&self) -> Vec<(String, &[Argument])> {
        let mut out = Vec::new();
        if !self.inputs.is_empty() {
            out.push((self.argument_node_name(INPUT_ARGUMENTS), self.inputs.as_slice()));
        }
        if !self.outputs.is_empty() {
            out.push((self.argument_node_name(OUTPUT_ARGUMENTS), self.outputs.as_slice()));
        }
        out
    }
}

/// Exclusive access to a descriptor's call slot.
pub struct CallGuard<'a> {
    descriptor: &'a MethodDescriptor,
    state: MutexGuard<'a, CallState>,
}

impl CallGuard<'_> {
    /// Store the call's arguments and caller. No validation happens here.
    pub fn bind(&mut self, args: Vec<Variant>, caller: UserIdentity) {
        *self.state = CallState::Bound(BoundCall::new(args, caller));
    }

    /// Validate the bound call and run it.
    pub fn execute(&mut self) -> Result<(), BridgeError> {
        let call = match std::mem::replace(&mut *self.state, CallState::Idle) {
            CallState::Bound(call) => call,
            _ => {
                return Err(BridgeError::argument(
                    StatusCode::BadArgumentsMissing,
                    "no call bound",
                ))
            }
        };
        let name = self.descriptor.name();

        if let Err(e) = validate(&self.descriptor.inputs, &call.args) {
            tracing::warn!(method = name, error = %e, "rejected method arguments");
            return Err(e);
        }

        match self.descriptor.procedure.run(&call) {
            Ok(output) => {
                tracing::info!(method = name, caller = ?call.caller, "method executed");
                *self.state = CallState::Executed(output);
                Ok(())
            }
            Err(e) => {
                match &e {
                    BridgeError::ArgumentInvalid { .. } => {
                        tracing::warn!(method = name, error = %e, "rejected method arguments")
                    }
                    _ => tracing::error!(method = name, error = %e, "method failed"),
                }
                Err(e)
            }
        }
    }

    /// Execute and return the procedure's output.
    pub fn execute_with_output(&mut self) -> Result<Option<Vec<Variant>>, BridgeError> {
        self.execute()?;
        match &*self.state {
            CallState::Executed(output) => Ok(output.clone()),
            _ => Ok(None),
        }
    }

    pub fn phase(&self) -> CallPhase {
        match &*self.state {
            CallState::Idle => CallPhase::Idle,
            CallState::Bound(_) => CallPhase::Bound,
            CallState::Executed(_) => CallPhase::Executed,
        }
    }
}

/// The fixed methods of one partition.
#[derive(Default)]
pub struct MethodSet {
    methods: Vec<MethodDescriptor>,
}

const ARGUMENTS_SPEC: FieldSpec = FieldSpec {
    name: "",
    data_type: ids::ARGUMENT,
    value_rank: 1,
    description: "Argument schema of the method",
    writable: false,
};

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: u16, procedure: impl Procedure + 'static) -> Self {
        self.methods.push(MethodDescriptor::new(namespace, procedure));
        self
    }

    pub fn get(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.methods.iter().map(|m| m.node_id.clone()).collect()
    }

    /// Descriptor for a method node or one of its argument properties.
    pub fn describe(&self, namespace: u16, name: &str) -> Option<NodeDescriptor> {
        if let Some(method) = self.get(name) {
            return Some(NodeDescriptor::method(
                NodeId::string(namespace, name),
                name,
                method.procedure.description(),
            ));
        }
        self.arguments_of(name).map(|(_, kind)| {
            let spec = FieldSpec {
                name: kind,
                ..ARGUMENTS_SPEC
            };
            NodeDescriptor::variable(NodeId::string(namespace, name), &spec, ids::PROPERTY_TYPE)
        })
    }

    /// Value of an argument property node.
    pub fn argument_value(&self, name: &str) -> Option<DataValue> {
        self.arguments_of(name)
            .map(|(args, _)| DataValue::new(Variant::Arguments(args.to_vec())))
    }

    /// References of a method node or one of its argument properties.
    pub fn references(&self, parent: &NodeId, name: &str) -> Option<Vec<Reference>> {
        if let Some(method) = self.get(name) {
            let mut builder = ReferenceBuilder::new(method.node_id.clone())
                .inverse(parent.clone(), ids::HAS_COMPONENT)
                .type_definition(ids::METHOD_NODE);
            for (property, _) in method.argument_nodes() {
                builder = builder.forward(
                    NodeId::string(method.node_id.namespace, property),
                    ids::HAS_PROPERTY,
                );
            }
            return Some(builder.build());
        }
        let (method, _) = self.owner_of(name)?;
        Some(
            ReferenceBuilder::new(NodeId::string(method.node_id.namespace, name))
                .inverse(method.node_id.clone(), ids::HAS_PROPERTY)
                .type_definition(ids::PROPERTY_TYPE)
                .build(),
        )
    }

    fn owner_of(&self, name: &str) -> Option<(&MethodDescriptor, &'static str)> {
        let (method_name, kind) = name.rsplit_once('/')?;
        let method = self.get(method_name)?;
        let kind = match kind {
            INPUT_ARGUMENTS if !method.inputs.is_empty() => INPUT_ARGUMENTS,
            OUTPUT_ARGUMENTS if !method.outputs.is_empty() => OUTPUT_ARGUMENTS,
            _ => return None,
        };
        Some((method, kind))
    }

    fn arguments_of(&self, name: &str) -> Option<(&[Argument], &'static str)> {
        let (method, kind) = self.owner_of(name)?;
        let args = if kind == INPUT_ARGUMENTS {
            method.inputs.as_slice()
        } else {
            method.outputs.as_slice()
        };
        Some((args, kind))
    }

    /// Run the method named `name`, or `Ok(None)` if there is none.
    pub fn call(
        &self,
        name: &str,
        caller: &UserIdentity,
        args: &[Variant],
    ) -> Result<Option<Vec<Variant>>, BridgeError> {
        match self.get(name) {
            Some(method) => method.invoke(args.to_vec(), caller.clone()),
            None => {
                tracing::debug!(method = name, "call to unknown method ignored");
                Ok(None)
            }
        }
    }
}
