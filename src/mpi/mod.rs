//! The MPI ("SMPI") deployment layer (spec §1 out-of-scope user API, §6
//! exposed deployment glue). Grounded on `smpi_deployment.cpp`.

pub mod deployment;

pub use deployment::Deployment;
