//! N-ary combinator shapes
//!
//! Plain combinators (`Union`, `Intersection`) fold their children into a
//! running accumulator, one statement per child. Combinators with an extra
//! argument (`SmoothUnion`) nest calls right-associatively instead.

use super::{EmitContext, Pass, helpers::Helper};
use crate::node::NodeId;
use crate::source::SourceBuilder;
use crate::{Error, Result};

impl EmitContext<'_> {
    /// `acc = a; acc = op(acc, b); acc = op(acc, c); ...`
    pub(super) fn accumulate(
        &mut self,
        pass: Pass,
        helper: &'static Helper,
        children: &[NodeId],
        sb: &mut SourceBuilder,
    ) -> Result<String> {
        let (first, rest) = children
            .split_first()
            .ok_or_else(|| Error::Configuration(format!("{} has no children", helper.name)))?;

        let first = self.emit(pass, *first, sb)?;
        if rest.is_empty() {
            return Ok(first);
        }

        self.require(helper);
        let acc = self.fresh_name(pass.accumulator_prefix());
        sb.statement(&format!("{} {} = {};", pass.result_type(), acc, first));
        for child in rest {
            let next = self.emit(pass, *child, sb)?;
            sb.statement(&format!("{acc} = {}({acc}, {next});", helper.name));
        }
        Ok(acc)
    }

    /// `op(a, op(b, op(c, d, k), k), k)`
    ///
    /// Every child is emitted before the call is assembled, so statements
    /// still appear in child order.
    pub(super) fn nest(
        &mut self,
        pass: Pass,
        helper: &'static Helper,
        extra: &str,
        children: &[NodeId],
        sb: &mut SourceBuilder,
    ) -> Result<String> {
        if children.is_empty() {
            return Err(Error::Configuration(format!("{} has no children", helper.name)));
        }

        let mut operands = Vec::with_capacity(children.len());
        for child in children {
            operands.push(self.emit(pass, *child, sb)?);
        }
        if operands.len() > 1 {
            self.require(helper);
        }

        let mut operands = operands.into_iter().rev();
        let mut nested = operands.next().unwrap_or_default();
        for operand in operands {
            nested = format!("{}({operand}, {nested}, {extra})", helper.name);
        }
        Ok(nested)
    }
}
