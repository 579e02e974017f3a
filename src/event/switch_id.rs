// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch identifier type.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;

/// Domain prefix of the entity id.
const ENTITY_DOMAIN: &str = "switch";

/// Stable identifier of a configured switch.
///
/// Wraps the configuration's object id, a lowercase slug such as
/// `living_room_amp`. The same id always yields the same entity id, so the
/// identity survives restarts even though the state does not.
///
/// # Examples
///
/// ```
/// use telnet_switch::event::SwitchId;
///
/// let id = SwitchId::new("projector").unwrap();
/// assert_eq!(id.entity_id(), "switch.projector");
///
/// assert!(SwitchId::new("Projector 1").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwitchId(Arc<str>);

impl SwitchId {
    /// Creates an identifier from an object id.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidObjectId` unless the id matches `[a-z0-9_]+`.
    pub fn new(object_id: impl AsRef<str>) -> Result<Self, ConfigError> {
        let object_id = object_id.as_ref();
        let valid = !object_id.is_empty()
            && object_id
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');

        if !valid {
            return Err(ConfigError::InvalidObjectId(object_id.to_string()));
        }

        Ok(Self(Arc::from(object_id)))
    }

    /// Returns the object id.
    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.0
    }

    /// Returns the entity id, `switch.<object_id>`.
    #[must_use]
    pub fn entity_id(&self) -> String {
        format!("{ENTITY_DOMAIN}.{}", self.0)
    }
}

impl fmt::Debug for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SwitchId({})", self.0)
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_slugs() {
        for id in ["amp", "tv_2", "living_room_amp", "42"] {
            assert!(SwitchId::new(id).is_ok(), "{id} should be accepted");
        }
    }

    #[test]
    fn rejects_non_slugs() {
        for id in ["", "Amp", "living room", "tv-2", "switch.amp", "café"] {
            assert!(
                matches!(SwitchId::new(id), Err(ConfigError::InvalidObjectId(_))),
                "{id} should be rejected"
            );
        }
    }

    #[test]
    fn entity_id_format() {
        let id = SwitchId::new("amp").unwrap();
        assert_eq!(id.entity_id(), "switch.amp");
        assert_eq!(id.object_id(), "amp");
    }

    #[test]
    fn equality_and_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(SwitchId::new("amp").unwrap());
        assert!(set.contains(&SwitchId::new("amp").unwrap()));
        assert!(!set.contains(&SwitchId::new("tv").unwrap()));
    }

    #[test]
    fn display_and_debug() {
        let id = SwitchId::new("amp").unwrap();
        assert_eq!(id.to_string(), "amp");
        assert_eq!(format!("{id:?}"), "SwitchId(amp)");
    }
}
