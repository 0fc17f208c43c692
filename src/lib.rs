// SPDX-License-Identifier: GPL-3.0-or-later

pub mod normalize;
pub mod probe;
pub mod report;
pub mod sources;
