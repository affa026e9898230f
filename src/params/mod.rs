pub mod physical_parameter_field;

pub use physical_parameter_field::{
    CellParams, LatLonRect, PhysicalParameterField, PhysicalParameterFieldBuilder,
};
