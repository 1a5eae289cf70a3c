// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod user_store;

pub use user_store::{
    default_customization, normalize_customization, InMemoryUserStore, NewUser, User,
    UserStore, UserStoreError, CUSTOMIZATION_LEN,
};
