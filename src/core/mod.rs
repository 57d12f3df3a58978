//! Core data types: declarations, their container and compile specs.

pub mod compile_spec;
pub mod container;
pub mod manifest;
pub mod pch;

pub use compile_spec::{CompileSpec, Language, Macro};
pub use container::{ContainerError, Named, NamedContainer};
pub use manifest::Manifest;
pub use pch::{PrecompiledHeader, PrecompiledHeaderContainer};
