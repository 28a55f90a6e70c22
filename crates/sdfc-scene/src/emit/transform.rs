//! Frame changes around a subtree
//!
//! ```text
//! Pos localPos_3 = p;
//! p = TransformPoint(forward, p);
//!     ...child statements...
//! HitResult localHit_4 = <child>;
//! localHit_4.position = TransformPoint(inverse, localHit_4.position);
//! localHit_4.normal = TransformDirection(inverse, localHit_4.normal);
//! p = localPos_3;
//! ```
//!
//! Distances are frame-invariant, so the distance pass skips the inverse.

use super::{EmitContext, Pass, helpers, helpers::Helper};
use crate::node::Transform;
use crate::source::SourceBuilder;
use crate::Result;

/// Helpers mapping points and directions in one geometry
pub(super) struct Geometry {
    point: &'static Helper,
    direction: &'static Helper,
}

pub(super) static EUCLIDEAN: Geometry = Geometry {
    point: &helpers::TRANSFORM_POINT,
    direction: &helpers::TRANSFORM_DIRECTION,
};

pub(super) static HYPERBOLIC: Geometry = Geometry {
    point: &helpers::TRANSFORM_POINT_H,
    direction: &helpers::TRANSFORM_DIRECTION_H,
};

impl EmitContext<'_> {
    pub(super) fn transform(
        &mut self,
        pass: Pass,
        geometry: &Geometry,
        transform: &Transform,
        sb: &mut SourceBuilder,
    ) -> Result<String> {
        let forward = self.source(&transform.forward)?;
        self.require(geometry.point);

        let saved = self.fresh_name("localPos");
        sb.statement(&format!("Pos {saved} = p;"));
        sb.statement(&format!("p = {}({forward}, p);", geometry.point.name));

        let mut child_statements = SourceBuilder::new();
        let child = self.emit(pass, transform.child, &mut child_statements)?;
        sb.append_builder(&child_statements);

        let local = self.fresh_name(pass.local_prefix());
        sb.statement(&format!("{} {local} = {child};", pass.result_type()));

        if pass == Pass::Hit {
            let inverse = self.source(&transform.inverse)?;
            self.require(geometry.direction);
            sb.statement(&format!(
                "{local}.position = {}({inverse}, {local}.position);",
                geometry.point.name
            ));
            sb.statement(&format!(
                "{local}.normal = {}({inverse}, {local}.normal);",
                geometry.direction.name
            ));
        }

        sb.statement(&format!("p = {saved};"));
        Ok(local)
    }
}
