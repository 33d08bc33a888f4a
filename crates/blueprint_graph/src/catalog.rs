//! # Standard Kinds
//!
//! A small physics-flavoured vocabulary registered by
//! [`Graph::with_standard_kinds`]. The kinds carry no physical behaviour;
//! they give the graph realistic roles, references and fields to work with.
//!
//! | kind        | roles                                              | references            |
//! |-------------|----------------------------------------------------|-----------------------|
//! | `world`     | bodies, geoms, sites, cameras, lights, tendons     |                       |
//! | `body`      | bodies, geoms, sites, joints, cameras, lights      |                       |
//! | `site`      | sensors, actuators                                 |                       |
//! | `camera`    |                                                    | target → body         |
//! | `light`     |                                                    | target → body         |
//! | `tendon`    |                                                    | bindings → sites      |
//! | `actuator`  |                                                    | ref_site → site       |

use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;
use crate::graph::Graph;
use crate::kind::{KindBuilder, KindFilter};
use crate::value::Value;

/// `world`
pub const WORLD: &str = "world";
/// `body`
pub const BODY: &str = "body";
/// `geom`
pub const GEOM: &str = "geom";
/// `mesh_geom`
pub const MESH_GEOM: &str = "mesh_geom";
/// `site`
pub const SITE: &str = "site";
/// `joint`
pub const JOINT: &str = "joint";
/// `camera`
pub const CAMERA: &str = "camera";
/// `light`
pub const LIGHT: &str = "light";
/// `tendon`
pub const TENDON: &str = "tendon";
/// `actuator`
pub const ACTUATOR: &str = "actuator";
/// `sensor`
pub const SENSOR: &str = "sensor";

/// Register every standard kind into `graph`
///
/// # Errors
///
/// [`GraphError::DuplicateKind`] if one of the names is already taken.
pub fn register_standard(graph: &mut Graph) -> GraphResult<()> {
    for builder in standard_kinds() {
        graph.register_kind(builder)?;
    }
    Ok(())
}

/// Builders for the standard kinds, leaves first
pub fn standard_kinds() -> Vec<KindBuilder> {
    let geoms = || KindFilter::one_of([GEOM, MESH_GEOM]);

    vec![
        KindBuilder::new(SENSOR).field("type", "touch").field("noise", 0.0_f32),
        KindBuilder::new(ACTUATOR)
            .field("gear", 1.0_f32)
            .field("ctrlrange", Value::Floats(vec![-1.0, 1.0]))
            .reference("ref_site", KindFilter::kind(SITE), false),
        KindBuilder::new(SITE)
            .spatial()
            .field("size", 0.01_f32)
            .role("sensors", KindFilter::kind(SENSOR))
            .role("actuators", KindFilter::kind(ACTUATOR)),
        KindBuilder::new(GEOM)
            .spatial()
            .field("type", "box")
            .field("size", Vec3::new(1.0, 1.0, 1.0))
            .field("mass", 1.0_f32)
            .field("color", Value::Floats(vec![0.5, 0.5, 0.5, 1.0]))
            .operation("scale", scale_geom),
        KindBuilder::new(MESH_GEOM)
            .spatial()
            .field("mass", 1.0_f32)
            .field("color", Value::Floats(vec![0.5, 0.5, 0.5, 1.0]))
            .resource_slot("mesh"),
        KindBuilder::new(JOINT)
            .spatial()
            .field("type", "hinge")
            .field("axis", Vec3::z())
            .field("range", Value::Floats(vec![0.0, 0.0])),
        KindBuilder::new(CAMERA)
            .spatial()
            .field("fovy", 45.0_f32)
            .reference("target", KindFilter::kind(BODY), false),
        KindBuilder::new(LIGHT)
            .spatial()
            .field("diffuse", Value::Floats(vec![0.7, 0.7, 0.7]))
            .reference("target", KindFilter::kind(BODY), false),
        KindBuilder::new(TENDON)
            .field("width", 0.003_f32)
            .reference("bindings", KindFilter::kind(SITE), true),
        KindBuilder::new(BODY)
            .spatial()
            .role("bodies", KindFilter::kind(BODY))
            .role("geoms", geoms())
            .role("sites", KindFilter::kind(SITE))
            .role("joints", KindFilter::kind(JOINT))
            .role("cameras", KindFilter::kind(CAMERA))
            .role("lights", KindFilter::kind(LIGHT)),
        KindBuilder::new(WORLD)
            .field("timestep", 0.002_f32)
            .role("bodies", KindFilter::kind(BODY))
            .role("geoms", geoms())
            .role("sites", KindFilter::kind(SITE))
            .role("cameras", KindFilter::kind(CAMERA))
            .role("lights", KindFilter::kind(LIGHT))
            .role("tendons", KindFilter::kind(TENDON)),
    ]
}

/// `scale(factor)`: multiply the geom size in place
fn scale_geom(graph: &mut Graph, node: NodeId, args: &[Value]) -> GraphResult<Value> {
    let factor = match args {
        [factor] => factor
            .as_float()
            .ok_or_else(|| GraphError::invalid("scale", format!("expected a number, got {}", factor.type_name())))?,
        _ => return Err(GraphError::invalid("scale", "expected one factor")),
    };
    let size = graph.field(node, "size")?.as_vec3().unwrap_or_else(Vec3::zeros);
    graph.set_field(node, "size", size * factor)?;
    Ok(Value::None)
}

// ============================================================================
// UNIT TESTS
// ============================================================================
