pub mod ice;
pub mod kernel;
pub mod moisture;
pub mod surface_energy;
pub mod transport;

pub use ice::{reconcile, IceParams, IceReconciliation};
pub use kernel::{EbmKernel, KernelSettings};
pub use moisture::MoistureParams;
pub use surface_energy::{AlbedoScheme, SurfaceEnergyParams};
pub use transport::{StencilCoefficients, TransportParams};
