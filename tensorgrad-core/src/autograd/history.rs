use super::context::Context;
use super::function::Op;
use crate::tensor::Tensor;

/// Edge from a derived tensor back to what produced it.
///
/// Attached once at creation and never modified. Inputs are held by shared
/// reference, so several edges may point at the same input node. Inputs always
/// predate the tensor owning the edge, which keeps the graph acyclic.
#[derive(Debug)]
pub struct History {
    pub(crate) op: Op,
    pub(crate) ctx: Context,
    pub(crate) inputs: Vec<Tensor>,
}

impl History {
    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }
}
