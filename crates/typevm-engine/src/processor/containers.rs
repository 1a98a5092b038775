//! Container opcode handlers: arrays, tuples, unions, intersections,
//! template literals, and argument-consuming well-known classes

use typevm_types::{
    merge_object_like, union_of, CartesianProduct, LiteralValue, Type, TypeId, TypeNode,
};

use super::{Processor, Slot};
use crate::error::ProcessorError;
use crate::registry::DEFAULT_ANNOTATION;

impl Processor<'_> {
    pub(super) fn op_array(&mut self) -> Result<(), ProcessorError> {
        let element = self.pop_type()?;
        self.push_node(TypeNode::Array { element })
    }

    pub(super) fn op_tuple(&mut self) -> Result<(), ProcessorError> {
        let produced = self.pop_frame_types()?;
        let mut members = Vec::with_capacity(produced.len());
        for id in produced {
            match self.arena.node(id).clone() {
                TypeNode::TupleMember { ty, .. } => {
                    // A rest of a tuple is spliced in place.
                    if let TypeNode::Rest { ty: inner } = self.arena.node(ty) {
                        if let TypeNode::Tuple { members: nested } = self.arena.node(*inner) {
                            members.extend(nested.iter().copied());
                            continue;
                        }
                    }
                    members.push(id);
                }
                TypeNode::Rest { ty } => {
                    if let TypeNode::Tuple { members: nested } = self.arena.node(ty) {
                        members.extend(nested.iter().copied());
                    } else {
                        let wrapped = self.arena.alloc(Type::new(TypeNode::TupleMember {
                            ty: id,
                            optional: false,
                            name: None,
                        }));
                        members.push(wrapped);
                    }
                }
                _ => {
                    let wrapped = self.arena.alloc(Type::new(TypeNode::TupleMember {
                        ty: id,
                        optional: false,
                        name: None,
                    }));
                    members.push(wrapped);
                }
            }
        }
        self.push_node(TypeNode::Tuple { members })
    }

    pub(super) fn op_tuple_member(&mut self) -> Result<(), ProcessorError> {
        let ty = self.pop_type()?;
        self.push_node(TypeNode::TupleMember { ty, optional: false, name: None })
    }

    pub(super) fn op_named_tuple_member(&mut self) -> Result<(), ProcessorError> {
        let index = self.eat_parameter()?;
        let name = self.pool_string(index)?;
        let top = self.pop_type()?;
        if let TypeNode::TupleMember { name: member_name, .. } =
            &mut self.arena.get_mut(top).node
        {
            *member_name = Some(name);
            self.push(Slot::Type(top));
            return Ok(());
        }
        self.push_node(TypeNode::TupleMember { ty: top, optional: false, name: Some(name) })
    }

    pub(super) fn op_rest(&mut self) -> Result<(), ProcessorError> {
        let ty = self.pop_type()?;
        self.push_node(TypeNode::Rest { ty })
    }

    pub(super) fn op_set(&mut self) -> Result<(), ProcessorError> {
        let element = self.pop_type()?;
        self.push_node(TypeNode::Class {
            name: Some("Set".to_string()),
            handle: None,
            members: Vec::new(),
            arguments: Some(vec![element]),
        })
    }

    pub(super) fn op_map(&mut self) -> Result<(), ProcessorError> {
        let value = self.pop_type()?;
        let key = self.pop_type()?;
        self.push_node(TypeNode::Class {
            name: Some("Map".to_string()),
            handle: None,
            members: Vec::new(),
            arguments: Some(vec![key, value]),
        })
    }

    pub(super) fn op_promise(&mut self) -> Result<(), ProcessorError> {
        let ty = self.pop_type()?;
        self.push_node(TypeNode::Promise { ty })
    }

    pub(super) fn op_union(&mut self) -> Result<(), ProcessorError> {
        let members = self.pop_frame_types()?;
        let id = union_of(self.arena, members);
        self.push(Slot::Type(id));
        Ok(())
    }

    /// Intersections classify their members: object-shaped candidates are
    /// merged structurally, a primitive member wins outright (keeping the
    /// candidates as metadata), and decorator markers attach to the result.
    pub(super) fn op_intersection(&mut self) -> Result<(), ProcessorError> {
        let members = self.pop_frame_types()?;
        let decorator = self.registry.decorator();

        let mut primitives = Vec::new();
        let mut candidates = Vec::new();
        let mut decorators = Vec::new();
        for id in members {
            if self.arena.get(id).is_never() {
                return self.push_node(TypeNode::Never);
            }
            match self.arena.node(id) {
                TypeNode::ObjectLiteral { .. } => {
                    if decorator(self.arena, id).is_some() {
                        decorators.push(id);
                    } else {
                        candidates.push(id);
                    }
                }
                TypeNode::Class { .. } => candidates.push(id),
                _ => primitives.push(id),
            }
        }

        let result = if let Some(&primitive) = primitives.first() {
            if !candidates.is_empty() {
                self.arena
                    .get_mut(primitive)
                    .annotations
                    .entry(DEFAULT_ANNOTATION.to_string())
                    .or_default()
                    .extend(candidates);
            }
            primitive
        } else if !candidates.is_empty() {
            merge_object_like(self.arena, &candidates)
        } else {
            self.arena.never()
        };

        for marker in decorators {
            let Some((key, args)) = decorator(self.arena, marker) else {
                continue;
            };
            let result_ty = self.arena.get_mut(result);
            result_ty.decorators.push(marker);
            result_ty.annotations.entry(key).or_default().extend(args);
        }

        self.push(Slot::Type(result));
        Ok(())
    }

    /// Expand a template literal: cartesian product over union
    /// placeholders, literal runs folded into single literals
    pub(super) fn op_template_literal(&mut self) -> Result<(), ProcessorError> {
        let parts = self.pop_frame_types()?;
        let mut product = CartesianProduct::new();
        for part in parts {
            product.add(self.arena, part);
        }

        let mut results = Vec::new();
        for combination in product.calculate() {
            results.push(self.expand_template_combination(&combination));
        }
        let id = union_of(self.arena, results);
        self.push(Slot::Type(id));
        Ok(())
    }

    fn expand_template_combination(&mut self, combination: &[TypeId]) -> TypeId {
        let mut members: Vec<TypeId> = Vec::new();
        let mut run: Option<String> = None;
        for &member in combination {
            match self.arena.node(member) {
                TypeNode::Literal(value) => {
                    let text = value.to_text();
                    match &mut run {
                        Some(current) => current.push_str(&text),
                        None => run = Some(text),
                    }
                }
                _ => {
                    if let Some(text) = run.take() {
                        members.push(self.arena.string_literal(text));
                    }
                    members.push(member);
                }
            }
        }
        if let Some(text) = run.take() {
            // A combination of pure literals folds to one literal.
            if members.is_empty() {
                return self.arena.string_literal(text);
            }
            members.push(self.arena.string_literal(text));
        }
        if members.is_empty() {
            return self.arena.literal(LiteralValue::String(String::new()));
        }
        // A single literal or bare `string` placeholder is used directly.
        if members.len() == 1
            && matches!(self.arena.node(members[0]), TypeNode::Literal(_) | TypeNode::String)
        {
            return members[0];
        }
        self.arena.alloc(Type::new(TypeNode::TemplateLiteral { types: members }))
    }
}
