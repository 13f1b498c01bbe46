// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod format;
pub mod hub;
pub mod ids;
pub mod model;
pub mod state;
pub mod tabs;

pub use format::*;
pub use hub::*;
pub use ids::*;
pub use model::*;
pub use state::*;
pub use tabs::*;
