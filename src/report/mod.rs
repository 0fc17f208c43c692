// SPDX-License-Identifier: GPL-3.0-or-later

//! Output rendering for the CLI.

pub mod json;
pub mod text;
