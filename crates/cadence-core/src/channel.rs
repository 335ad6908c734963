//! Named, typed mutable slots that controllers write into and renderers read from

use crate::{CadenceError, Result};
use glam::{Mat3, Mat4, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// A value stored in a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelValue {
    Float(f32),
    Vector(Vec3),
    Matrix3(Mat3),
    Matrix4(Mat4),
    Bool(bool),
}

impl ChannelValue {
    /// Short name of the variant, used in type-mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            ChannelValue::Float(_) => "float",
            ChannelValue::Vector(_) => "vector",
            ChannelValue::Matrix3(_) => "matrix3",
            ChannelValue::Matrix4(_) => "matrix4",
            ChannelValue::Bool(_) => "bool",
        }
    }
}

impl From<f32> for ChannelValue {
    fn from(v: f32) -> Self {
        ChannelValue::Float(v)
    }
}

impl From<Vec3> for ChannelValue {
    fn from(v: Vec3) -> Self {
        ChannelValue::Vector(v)
    }
}

impl From<Mat3> for ChannelValue {
    fn from(v: Mat3) -> Self {
        ChannelValue::Matrix3(v)
    }
}

impl From<Mat4> for ChannelValue {
    fn from(v: Mat4) -> Self {
        ChannelValue::Matrix4(v)
    }
}

impl From<bool> for ChannelValue {
    fn from(v: bool) -> Self {
        ChannelValue::Bool(v)
    }
}

/// Handle to a shared, named value slot.
///
/// Cloning a `Channel` yields another handle to the same slot. The slot itself
/// belongs to whatever created it (a scene node, a blend-shape weight, ...);
/// controllers only keep handles.
#[derive(Debug, Clone)]
pub struct Channel {
    name: Rc<str>,
    slot: Rc<RefCell<ChannelValue>>,
}

impl Channel {
    pub fn new(name: impl Into<String>, value: impl Into<ChannelValue>) -> Self {
        let name: String = name.into();
        Self {
            name: Rc::from(name),
            slot: Rc::new(RefCell::new(value.into())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> ChannelValue {
        *self.slot.borrow()
    }

    /// Overwrite the slot unconditionally, changing its kind if needed.
    pub fn set(&self, value: impl Into<ChannelValue>) {
        *self.slot.borrow_mut() = value.into();
    }

    /// Overwrite the slot only if `value` has the same kind as the current value.
    pub fn set_checked(&self, value: impl Into<ChannelValue>) -> Result<()> {
        let value = value.into();
        let mut slot = self.slot.borrow_mut();
        if std::mem::discriminant(&*slot) != std::mem::discriminant(&value) {
            return Err(CadenceError::ChannelType {
                channel: self.name.to_string(),
                expected: slot.kind(),
                got: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Whether two handles point at the same slot
    pub fn same_slot(&self, other: &Channel) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    pub fn get_float(&self) -> Result<f32> {
        match self.get() {
            ChannelValue::Float(v) => Ok(v),
            other => Err(self.mismatch("float", &other)),
        }
    }

    pub fn get_vector(&self) -> Result<Vec3> {
        match self.get() {
            ChannelValue::Vector(v) => Ok(v),
            other => Err(self.mismatch("vector", &other)),
        }
    }

    pub fn get_matrix3(&self) -> Result<Mat3> {
        match self.get() {
            ChannelValue::Matrix3(v) => Ok(v),
            other => Err(self.mismatch("matrix3", &other)),
        }
    }

    pub fn get_matrix4(&self) -> Result<Mat4> {
        match self.get() {
            ChannelValue::Matrix4(v) => Ok(v),
            other => Err(self.mismatch("matrix4", &other)),
        }
    }

    pub fn get_bool(&self) -> Result<bool> {
        match self.get() {
            ChannelValue::Bool(v) => Ok(v),
            other => Err(self.mismatch("bool", &other)),
        }
    }

    fn mismatch(&self, expected: &'static str, got: &ChannelValue) -> CadenceError {
        CadenceError::ChannelType {
            channel: self.name.to_string(),
            expected,
            got: got.kind(),
        }
    }
}
