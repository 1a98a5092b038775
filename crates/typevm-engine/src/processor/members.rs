//! Member productions and adjective opcode handlers
//!
//! Properties, methods, parameters, and the structured aggregates built
//! from them. Adjective opcodes (`optional`, `readonly`, visibility,
//! `abstract`, `defaultValue`, `description`) mutate the member sitting on
//! top of the stack in place; on a slot that is not member-shaped they are
//! inert, matching the processor's trust in its input.

use typevm_types::{Type, TypeId, TypeNode, Visibility};

use super::{Processor, Slot};
use crate::error::ProcessorError;

impl Processor<'_> {
    /// Build a property (`signature: false`) or property signature
    ///
    /// A two-member `T | undefined` union reduces to `T` with the member
    /// marked optional.
    pub(super) fn op_property(&mut self, signature: bool) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let name = self.pool_string(index)?;
        let ty = self.pop_type()?;
        let (ty, optional) = self.strip_optional_undefined(ty);
        let node = if signature {
            TypeNode::PropertySignature { name, ty, optional, readonly: false, description: None }
        } else {
            TypeNode::Property {
                name,
                ty,
                optional,
                readonly: false,
                visibility: Visibility::Public,
                is_abstract: false,
                description: None,
                default: None,
            }
        };
        self.push_node(node)
    }

    pub(super) fn op_method(&mut self, signature: bool) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let name = self.pool_string(index)?;
        let (parameters, ret) = self.pop_signature_frame()?;
        let node = if signature {
            TypeNode::MethodSignature { name, parameters, ret }
        } else {
            TypeNode::Method {
                name,
                parameters,
                ret,
                visibility: Visibility::Public,
                is_abstract: false,
            }
        };
        self.push_node(node)
    }

    pub(super) fn op_function(&mut self) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let name = self.pool_string(index)?;
        let (parameters, ret) = self.pop_signature_frame()?;
        let name = if name.is_empty() { None } else { Some(name) };
        self.push_node(TypeNode::Function { name, parameters, ret })
    }

    /// A signature frame holds the parameters with the return type last
    fn pop_signature_frame(&mut self) -> Result<(Vec<TypeId>, TypeId), ProcessorError> {
        let mut produced = self.pop_frame_types()?;
        let ret = match produced.pop() {
            Some(ret) => ret,
            None => return Err(self.invalid("signature frame without a return type")),
        };
        Ok((produced, ret))
    }

    pub(super) fn op_parameter(&mut self) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let name = self.pool_string(index)?;
        let ty = self.pop_type()?;
        self.push_node(TypeNode::Parameter {
            name,
            ty,
            optional: false,
            readonly: false,
            visibility: None,
            default: None,
        })
    }

    pub(super) fn op_index_signature(&mut self) -> Result<(), ProcessorError> {
        let ty = self.pop_type()?;
        let index = self.pop_type()?;
        self.push_node(TypeNode::IndexSignature { index, ty })
    }

    pub(super) fn op_enum_member(&mut self) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let name = self.pool_string(index)?;
        self.push_node(TypeNode::EnumMember { name, default: None })
    }

    pub(super) fn op_object_literal(&mut self) -> Result<(), ProcessorError> {
        let members = self.pop_frame_types()?;
        self.finish_structured(TypeNode::ObjectLiteral { members })
    }

    /// Build a class: project constructor parameters carrying an
    /// accessibility modifier (public, protected, or private) into
    /// synthetic properties and attach the frame's generic arguments
    pub(super) fn op_class(&mut self) -> Result<(), ProcessorError> {
        let mut members = self.pop_frame_types()?;

        let constructor = members.iter().copied().find(|&m| {
            matches!(self.arena.node(m), TypeNode::Method { name, .. } if name == "constructor")
        });
        if let Some(constructor) = constructor {
            if let TypeNode::Method { parameters, .. } = self.arena.node(constructor) {
                let parameters = parameters.clone();
                for parameter in parameters {
                    if let TypeNode::Parameter {
                        name,
                        ty,
                        optional,
                        readonly,
                        visibility: Some(visibility),
                        default,
                    } = self.arena.node(parameter).clone()
                    {
                        let property = self.arena.alloc(Type::new(TypeNode::Property {
                            name,
                            ty,
                            optional,
                            readonly,
                            visibility,
                            is_abstract: false,
                            description: None,
                            default,
                        }));
                        members.push(property);
                    }
                }
            }
        }

        let inputs = &self.frame().inputs;
        let arguments = if inputs.is_empty() { None } else { Some(inputs.clone()) };
        self.finish_structured(TypeNode::Class { name: None, handle: None, members, arguments })
    }

    /// Allocate the node, or give the result anchor its final shape when
    /// this is the program's final opcode
    fn finish_structured(&mut self, node: TypeNode) -> Result<(), ProcessorError> {
        let id = if self.at_final_op() {
            self.arena.replace(self.result_type, Type::new(node));
            self.result_type
        } else {
            self.arena.alloc(Type::new(node))
        };
        self.push(Slot::Type(id));
        Ok(())
    }

    pub(super) fn strip_optional_undefined(&self, ty: TypeId) -> (TypeId, bool) {
        if let TypeNode::Union { types } = self.arena.node(ty) {
            if types.len() == 2 {
                let first_undefined = matches!(self.arena.node(types[0]), TypeNode::Undefined);
                let second_undefined = matches!(self.arena.node(types[1]), TypeNode::Undefined);
                if first_undefined != second_undefined {
                    let kept = if first_undefined { types[1] } else { types[0] };
                    return (kept, true);
                }
            }
        }
        (ty, false)
    }

    // ========================================================================
    // Adjectives
    // ========================================================================

    fn top_type(&mut self) -> Result<TypeId, ProcessorError> {
        match self.stack.last() {
            Some(Slot::Type(id)) => Ok(*id),
            Some(other) => {
                Err(self.invalid(format!("expected a type on the stack, found {other:?}")))
            }
            None => Err(self.invalid("stack underflow")),
        }
    }

    pub(super) fn op_optional(&mut self) -> Result<(), ProcessorError> {
        let id = self.top_type()?;
        match &mut self.arena.get_mut(id).node {
            TypeNode::TupleMember { optional, .. }
            | TypeNode::Property { optional, .. }
            | TypeNode::PropertySignature { optional, .. }
            | TypeNode::Parameter { optional, .. } => *optional = true,
            _ => {}
        }
        Ok(())
    }

    pub(super) fn op_readonly(&mut self) -> Result<(), ProcessorError> {
        let id = self.top_type()?;
        match &mut self.arena.get_mut(id).node {
            TypeNode::Property { readonly, .. }
            | TypeNode::PropertySignature { readonly, .. }
            | TypeNode::Parameter { readonly, .. } => *readonly = true,
            _ => {}
        }
        Ok(())
    }

    pub(super) fn op_visibility(&mut self, new: Visibility) -> Result<(), ProcessorError> {
        let id = self.top_type()?;
        match &mut self.arena.get_mut(id).node {
            TypeNode::Property { visibility, .. } | TypeNode::Method { visibility, .. } => {
                *visibility = new;
            }
            TypeNode::Parameter { visibility, .. } => *visibility = Some(new),
            _ => {}
        }
        Ok(())
    }

    pub(super) fn op_abstract(&mut self) -> Result<(), ProcessorError> {
        let id = self.top_type()?;
        match &mut self.arena.get_mut(id).node {
            TypeNode::Property { is_abstract, .. } | TypeNode::Method { is_abstract, .. } => {
                *is_abstract = true;
            }
            _ => {}
        }
        Ok(())
    }

    pub(super) fn op_default_value(&mut self) -> Result<(), ProcessorError> {
        let value = self.pop_type()?;
        let id = self.top_type()?;
        match &mut self.arena.get_mut(id).node {
            TypeNode::Property { default, .. }
            | TypeNode::Parameter { default, .. }
            | TypeNode::EnumMember { default, .. } => *default = Some(value),
            _ => {}
        }
        Ok(())
    }

    pub(super) fn op_description(&mut self) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let text = self.pool_string(index)?;
        let id = self.top_type()?;
        match &mut self.arena.get_mut(id).node {
            TypeNode::Property { description, .. }
            | TypeNode::PropertySignature { description, .. } => *description = Some(text),
            _ => {}
        }
        Ok(())
    }
}
