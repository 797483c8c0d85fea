// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod keyfilter;
pub mod model;
pub mod pagination;
pub mod query;
pub mod state;

pub use keyfilter::*;
pub use model::*;
pub use pagination::*;
pub use query::*;
pub use state::*;
