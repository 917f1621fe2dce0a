//! Service layer between the HTTP surface and the cluster

pub mod dependency_service;

pub use dependency_service::{DependencyService, ResourceDependencies, ResourceReport};
