//! Scene constant buffer
//!
//! A scene declares [`Parameter`]s, which become members of its constant
//! buffer, and collects [`ParameterFeed`]s that refresh those members every
//! frame. Writes go through [`ParameterSink`], implemented by whatever owns
//! the GPU-side buffer. [`ConstantBlock`] is a CPU-side implementation that
//! packs members the way HLSL does.

use std::collections::HashMap;

use bytemuck::Pod;
use serde::Serialize;

use crate::{Error, Result};

/// Size of one HLSL constant register in bytes
pub const REGISTER_SIZE: usize = 16;

/// One declared constant-buffer member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Shader type name from the type registry
    pub type_name: String,
    /// Size of the host value in bytes
    pub size: usize,
}

/// Destination of per-frame parameter writes
pub trait ParameterSink {
    /// Overwrite member `name` with `bytes`
    fn write_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
}

impl dyn ParameterSink + '_ {
    /// Write a plain-old-data value into member `name`
    pub fn write_value<T: Pod>(&mut self, name: &str, value: &T) -> Result<()> {
        self.write_bytes(name, bytemuck::bytes_of(value))
    }
}

type WriteFn = dyn Fn(&mut dyn ParameterSink) -> Result<()> + Send + Sync;

/// A per-frame writer, run before every dispatch
pub struct ParameterFeed {
    label: String,
    write: Box<WriteFn>,
}

impl ParameterFeed {
    pub fn new<F>(label: impl Into<String>, write: F) -> Self
    where
        F: Fn(&mut dyn ParameterSink) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            write: Box::new(write),
        }
    }

    /// Slot name for dynamic expressions, caller-chosen otherwise
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn run(&self, sink: &mut dyn ParameterSink) -> Result<()> {
        (self.write)(sink)
    }
}

impl std::fmt::Debug for ParameterFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterFeed")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Placement of one member inside a constant block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberLayout {
    pub name: String,
    pub offset: usize,
    pub size: usize,
}

/// CPU-side copy of a constant buffer
#[derive(Debug, Clone, Default)]
pub struct ConstantBlock {
    members: Vec<MemberLayout>,
    index: HashMap<String, usize>,
    data: Vec<u8>,
}

impl ConstantBlock {
    /// Block with offsets reported by shader reflection
    ///
    /// Every member must fit inside `size` bytes.
    pub fn from_layout(members: Vec<MemberLayout>, size: usize) -> Result<Self> {
        for member in &members {
            let end = member.offset.checked_add(member.size);
            if end.is_none_or(|end| end > size) {
                return Err(Error::InvalidParameter(format!(
                    "member {} at offset {} ({} bytes) does not fit a {size}-byte block",
                    member.name, member.offset, member.size
                )));
            }
        }
        Ok(Self::with_members(members, size))
    }

    fn with_members(members: Vec<MemberLayout>, size: usize) -> Self {
        let index = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        Self {
            members,
            index,
            data: vec![0; size],
        }
    }

    /// Block laid out with HLSL constant-buffer packing rules
    ///
    /// Members are placed in declaration order. A member never straddles a
    /// 16-byte register: if it would, it starts at the next register instead.
    /// Members of 16 bytes or more always start on a register boundary. The
    /// total size is rounded up to whole registers.
    pub fn packed(parameters: &[Parameter]) -> Self {
        let mut members = Vec::with_capacity(parameters.len());
        let mut offset = 0;

        for param in parameters {
            let register_left = REGISTER_SIZE - offset % REGISTER_SIZE;
            if param.size >= REGISTER_SIZE || param.size > register_left {
                offset = offset.next_multiple_of(REGISTER_SIZE);
            }
            members.push(MemberLayout {
                name: param.name.clone(),
                offset,
                size: param.size,
            });
            offset += param.size;
        }

        Self::with_members(members, offset.next_multiple_of(REGISTER_SIZE))
    }

    pub fn member(&self, name: &str) -> Option<&MemberLayout> {
        self.index.get(name).map(|&i| &self.members[i])
    }

    pub fn members(&self) -> &[MemberLayout] {
        &self.members
    }

    /// Current bytes of member `name`
    pub fn bytes(&self, name: &str) -> Result<&[u8]> {
        let member = self.lookup(name)?;
        self.data
            .get(member.offset..member.offset + member.size)
            .ok_or_else(|| out_of_block(name))
    }

    /// Current value of member `name`
    pub fn read<T: Pod>(&self, name: &str) -> Result<T> {
        let bytes = self.bytes(name)?;
        if bytes.len() != size_of::<T>() {
            return Err(Error::InvalidParameter(format!(
                "member {name} is {} bytes, cannot read {} bytes",
                bytes.len(),
                size_of::<T>()
            )));
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// The whole block, ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn lookup(&self, name: &str) -> Result<&MemberLayout> {
        self.member(name)
            .ok_or_else(|| Error::Lookup(format!("No constant buffer member named {name}")))
    }
}

fn out_of_block(name: &str) -> Error {
    Error::InvalidParameter(format!("member {name} lies outside the constant block"))
}

impl ParameterSink for ConstantBlock {
    fn write_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let member = self.lookup(name)?;
        if bytes.len() != member.size {
            return Err(Error::InvalidParameter(format!(
                "member {name} is {} bytes, got {} bytes",
                member.size,
                bytes.len()
            )));
        }
        let range = member.offset..member.offset + member.size;
        let slot = self.data.get_mut(range).ok_or_else(|| out_of_block(name))?;
        slot.copy_from_slice(bytes);
        Ok(())
    }
}
