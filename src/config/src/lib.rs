// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

pub mod config;
pub mod ider;
pub mod meta;
pub mod utils;

pub use config::*;

pub fn init() -> Result<(), anyhow::Error> {
    // force config load so invalid environments fail at startup
    let cfg = get_config();
    if cfg.escalation.tick_interval == 0 {
        return Err(anyhow::anyhow!(
            "OP_ESCALATION_TICK_INTERVAL must be greater than zero"
        ));
    }
    Ok(())
}
