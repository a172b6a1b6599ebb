//! sv-cloud - Cloud lookups for schemaver
//!
//! Provides the `CommandRunner` abstraction over external processes and
//! the `EndpointResolver` that finds a managed database cluster's endpoint.

pub mod command;
pub mod error;
pub mod resolver;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use error::{CloudError, CloudResult};
pub use resolver::{AwsCliResolver, EndpointResolver, StaticResolver};
