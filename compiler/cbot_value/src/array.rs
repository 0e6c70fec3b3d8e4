//! Array storage.
//!
//! An array owns one cell per element. `limits[0]` bounds this array's
//! length; the remaining limits are handed to nested arrays created on
//! demand, so `int a[4][3]` yields rows bounded by 3.

use cbot_diagnostic::ErrorCode;
use cbot_ir::TypeDesc;

use crate::convert::zero_value;
use crate::{ArrayRef, Value, Var, VarCell};

/// Largest element index any array accepts, and the largest limit a
/// declaration may give. Writes beyond it raise `OutArray` whatever the
/// declared limit, so one store never allocates more than this many cells.
pub const MAX_ARRAY_SIZE: u32 = 9999;

#[derive(Debug)]
pub struct ArrayData {
    elem: TypeDesc,
    limits: Vec<Option<u32>>,
    items: Vec<VarCell>,
}

impl ArrayData {
    /// An empty array. Missing limits mean "unbounded".
    pub fn new(elem: TypeDesc, limits: Vec<Option<u32>>) -> Self {
        ArrayData {
            elem,
            limits,
            items: Vec::new(),
        }
    }

    #[inline]
    pub fn elem(&self) -> &TypeDesc {
        &self.elem
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Declared maximum length, if any.
    pub fn limit(&self) -> Option<u32> {
        self.limits.first().copied().flatten()
    }

    pub fn limits(&self) -> &[Option<u32>] {
        &self.limits
    }

    pub fn items(&self) -> &[VarCell] {
        &self.items
    }

    /// Cell of an existing element. Reading past the end is `OutArray`.
    pub fn get(&self, index: i64) -> Result<VarCell, ErrorCode> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .cloned()
            .ok_or(ErrorCode::OutArray)
    }

    /// Cell of an element for writing, growing the array up to its limit.
    pub fn get_or_grow(&mut self, index: i64) -> Result<VarCell, ErrorCode> {
        let idx = usize::try_from(index).map_err(|_| ErrorCode::OutArray)?;
        if idx > MAX_ARRAY_SIZE as usize {
            return Err(ErrorCode::OutArray);
        }
        if let Some(limit) = self.limit() {
            if idx >= limit as usize {
                return Err(ErrorCode::OutArray);
            }
        }
        while self.items.len() <= idx {
            let cell = self.new_element();
            self.items.push(cell);
        }
        Ok(self.items[idx].clone())
    }

    /// Append an element, for array initializers.
    pub fn push(&mut self, cell: VarCell) -> Result<(), ErrorCode> {
        if self.items.len() > MAX_ARRAY_SIZE as usize {
            return Err(ErrorCode::OutArray);
        }
        if let Some(limit) = self.limit() {
            if self.items.len() >= limit as usize {
                return Err(ErrorCode::OutArray);
            }
        }
        self.items.push(cell);
        Ok(())
    }

    /// Restore hook: replace the element list wholesale.
    pub fn set_items(&mut self, items: Vec<VarCell>) {
        self.items = items;
    }

    /// A `Default` element cell; nested arrays are created empty with the
    /// remaining limits.
    fn new_element(&self) -> VarCell {
        let value = match &self.elem {
            TypeDesc::Array(inner) => {
                let rest = self.limits.get(1..).unwrap_or_default().to_vec();
                Value::Array(ArrayRef::new(ArrayData::new((**inner).clone(), rest)))
            }
            ty => zero_value(ty),
        };
        VarCell::new(Var::with_default(self.elem.clone(), value))
    }

    /// `{ 2, 4, 6 }`, or `{  }` when empty.
    pub fn to_text(&self) -> String {
        let items: Vec<String> = self.items.iter().map(|c| c.borrow().to_text()).collect();
        format!("{{ {} }}", items.join(", "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
