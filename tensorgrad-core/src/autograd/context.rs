use crate::error::TensorGradError;
use crate::storage::Storage;

/// A value stashed during forward for use in backward.
#[derive(Debug, Clone)]
pub enum SavedValue {
    Storage(Storage),
    Shape(Vec<usize>),
    Order(Vec<usize>),
}

impl SavedValue {
    fn kind(&self) -> &'static str {
        match self {
            SavedValue::Storage(_) => "storage",
            SavedValue::Shape(_) => "shape",
            SavedValue::Order(_) => "order",
        }
    }
}

/// Per-invocation scratch record of one operation application.
///
/// When `no_grad` is set, nothing will ever read the saved values, so
/// `save_for_backward` drops them instead of holding the buffers alive.
#[derive(Debug, Clone, Default)]
pub struct Context {
    no_grad: bool,
    saved: Vec<SavedValue>,
}

impl Context {
    pub fn new(no_grad: bool) -> Self {
        Context {
            no_grad,
            saved: Vec::new(),
        }
    }

    pub fn no_grad(&self) -> bool {
        self.no_grad
    }

    pub fn save_for_backward(&mut self, values: impl IntoIterator<Item = SavedValue>) {
        if self.no_grad {
            return;
        }
        self.saved.extend(values);
    }

    pub fn saved_values(&self) -> &[SavedValue] {
        &self.saved
    }

    fn slot(&self, operation: &str, index: usize, kind: &str) -> Result<&SavedValue, TensorGradError> {
        self.saved
            .get(index)
            .ok_or_else(|| TensorGradError::SavedStateArity {
                operation: operation.to_string(),
                expected: format!("{} at position {}", kind, index),
                found: format!("{} saved value(s)", self.saved.len()),
            })
    }

    fn mismatch(operation: &str, index: usize, kind: &str, found: &SavedValue) -> TensorGradError {
        TensorGradError::SavedStateArity {
            operation: operation.to_string(),
            expected: format!("{} at position {}", kind, index),
            found: found.kind().to_string(),
        }
    }

    pub(crate) fn storage(&self, operation: &str, index: usize) -> Result<&Storage, TensorGradError> {
        match self.slot(operation, index, "storage")? {
            SavedValue::Storage(s) => Ok(s),
            other => Err(Self::mismatch(operation, index, "storage", other)),
        }
    }

    pub(crate) fn shape(&self, operation: &str, index: usize) -> Result<&[usize], TensorGradError> {
        match self.slot(operation, index, "shape")? {
            SavedValue::Shape(s) => Ok(s),
            other => Err(Self::mismatch(operation, index, "shape", other)),
        }
    }

    pub(crate) fn order(&self, operation: &str, index: usize) -> Result<&[usize], TensorGradError> {
        match self.slot(operation, index, "order")? {
            SavedValue::Order(o) => Ok(o),
            other => Err(Self::mismatch(operation, index, "order", other)),
        }
    }
}
