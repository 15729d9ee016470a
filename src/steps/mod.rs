//! Step descriptors, handlers and the built-in catalog.
//!
//! - [`StepDescriptor`] is one entry of the configured step list
//! - [`StepHandler`] is the behavior behind a step name, kept in a
//!   [`HandlerRegistry`]
//! - [`TemplateStep`] is a handler described entirely by command templates
//! - [`registry_for`] builds the registry for a loaded configuration
//!
//! # Example
//!
//! ```
//! use orgbuilder::config::BuilderConfig;
//! use orgbuilder::steps::{registry_for, StepDescriptor};
//!
//! let config = BuilderConfig::default();
//! let registry = registry_for(&config);
//! let step = StepDescriptor::name("PushMetadata");
//! let (name, data) = step.resolve(0).unwrap();
//! assert!(registry.contains(name));
//! assert!(data.is_none());
//! ```

pub mod builtin;
pub mod descriptor;
pub mod handler;
pub mod outcome;
pub mod template;

pub use builtin::{find_alias, find_password, register_builtin, registry_for, template_vars};
pub use descriptor::StepDescriptor;
pub use handler::{HandlerRegistry, StepHandler};
pub use outcome::{StepOutcome, StepStatus};
pub use template::{payload_items, payload_vars, CommandShape, TemplateStep};
