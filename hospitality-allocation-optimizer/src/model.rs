// the identifiers come from the booking application, we only need them to be unique per event

use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub String);

            impl $name {
                pub fn new(identifier: impl Into<String>) -> Self {
                    Self(identifier.into())
                }

                #[must_use]
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_owned())
                }
            }
        )*
    };
}

identifier!(GuestId, RoomId, FamilyId, CaseId, EventId);

/// Capacity units a guest consumes, a family of three travelling as one
/// booking has an occupancy of 3.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Occupancy(pub u32);

impl Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    pub occupancy: Occupancy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<FamilyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_guest_id: Option<GuestId>,
}

impl Guest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, occupancy: u32) -> Self {
        Self {
            id: GuestId::new(id),
            name: name.into(),
            occupancy: Occupancy(occupancy),
            family_id: None,
            head_guest_id: None,
        }
    }

    #[must_use]
    pub fn in_family(mut self, family_id: impl Into<String>, head_guest_id: Option<&str>) -> Self {
        self.family_id = Some(FamilyId::new(family_id));
        self.head_guest_id = head_guest_id.map(GuestId::from);
        self
    }
}

/// Cancellation terms a room was booked under.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyType {
    Flexible,
    Refundable,
    NonRefundable,
}

impl PolicyType {
    /// Whether the room can be given back to the hotel without paying a penalty.
    #[must_use]
    pub const fn allows_penalty_free_release(self) -> bool {
        matches!(self, Self::Flexible | Self::Refundable)
    }
}

impl Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flexible => "flexible",
            Self::Refundable => "refundable",
            Self::NonRefundable => "non-refundable",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub max_capacity: u32,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub hotel_name: String,
    pub policy_type: PolicyType,
}

impl Room {
    pub fn new(id: impl Into<String>, max_capacity: u32, policy_type: PolicyType) -> Self {
        Self {
            id: RoomId::new(id),
            max_capacity,
            room_type: String::new(),
            hotel_name: String::new(),
            policy_type,
        }
    }

    #[must_use]
    pub fn at_hotel(mut self, hotel_name: impl Into<String>, room_type: impl Into<String>) -> Self {
        self.hotel_name = hotel_name.into();
        self.room_type = room_type.into();
        self
    }
}

/// The guests currently placed in one room, in the order they were placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub room_id: RoomId,
    pub guest_ids: Vec<GuestId>,
}

impl Group {
    #[must_use]
    pub fn contains(&self, guest_id: &GuestId) -> bool {
        self.guest_ids.contains(guest_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_release() {
        assert!(PolicyType::Flexible.allows_penalty_free_release());
        assert!(PolicyType::Refundable.allows_penalty_free_release());
        assert!(!PolicyType::NonRefundable.allows_penalty_free_release());
    }

    #[test]
    fn guest_json_uses_collaborator_field_names() -> Result<(), serde_json::Error> {
        let guest: Guest = serde_json::from_str(
            r#"{"id":"g1","name":"Sharma family","occupancy":3,"familyId":"f1","headGuestId":"g1"}"#,
        )?;
        assert_eq!(guest.occupancy, Occupancy(3));
        assert_eq!(guest.family_id, Some(FamilyId::from("f1")));
        assert_eq!(guest.head_guest_id, Some(GuestId::from("g1")));

        let room: Room =
            serde_json::from_str(r#"{"id":"302","maxCapacity":2,"policyType":"non-refundable"}"#)?;
        assert_eq!(room.policy_type, PolicyType::NonRefundable);
        assert!(room.hotel_name.is_empty());
        Ok(())
    }
}
