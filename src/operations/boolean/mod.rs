mod bsp;
mod engine;
mod polygons;
mod subtract;
mod union;

pub use engine::BooleanOp;
pub use subtract::Subtract;
pub use union::Union;
