//! Prelude module - commonly used test helpers.
//!
//! Use `use capgate_test::prelude::*;` to import all fixtures and mocks.

// Fixtures
pub use crate::{allow, deny, echo_resource, echo_resource_builder, modify, test_principal};

// Mocks
pub use crate::{CallLog, CountingHandler, counting_handler, tagging_modifier};

// Logging
pub use crate::init_test_logging;
