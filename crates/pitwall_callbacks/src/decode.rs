//! Raw payload decoding.
//!
//! [`decode_callback`] is a total mapping from callback name to payload decoder:
//! every name the dispatcher claims to support has a decoder here, and a name
//! without one yields `Ok(None)` rather than an error. Decoding is a pure
//! function of its inputs; no dispatcher state is consulted.

use crate::events::{
    AfkStatusEvent, BillUpdatedEvent, CaptureEvent, PlayerChatEvent, RecordEvent, ScriptEvent,
    ShootEvent, WarmUpStatusEvent, Weapon, WeaponContactEvent,
};
use crate::{names, BillId};
use serde_json::Value;

/// Errors produced by payload decoding.
///
/// The host payload is positional and not self-describing, so errors carry the
/// callback name and field index to make operator logs actionable.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Payload has fewer fields than the callback's shape requires
    #[error("{callback} payload is missing field {index}")]
    MissingField { callback: String, index: usize },
    /// Payload field holds a value of the wrong type
    #[error("{callback} payload field {index} is not a {expected}")]
    WrongType {
        callback: String,
        index: usize,
        expected: &'static str,
    },
}

fn field<'a>(callback: &str, payload: &'a [Value], index: usize) -> Result<&'a Value, DecodeError> {
    payload.get(index).ok_or_else(|| DecodeError::MissingField {
        callback: callback.to_string(),
        index,
    })
}

fn str_field(callback: &str, payload: &[Value], index: usize) -> Result<String, DecodeError> {
    field(callback, payload, index)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DecodeError::WrongType {
            callback: callback.to_string(),
            index,
            expected: "string",
        })
}

fn int_field(callback: &str, payload: &[Value], index: usize) -> Result<i64, DecodeError> {
    field(callback, payload, index)?
        .as_i64()
        .ok_or_else(|| DecodeError::WrongType {
            callback: callback.to_string(),
            index,
            expected: "integer",
        })
}

fn uint_field(callback: &str, payload: &[Value], index: usize) -> Result<u32, DecodeError> {
    let raw = int_field(callback, payload, index)?;
    u32::try_from(raw).map_err(|_| DecodeError::WrongType {
        callback: callback.to_string(),
        index,
        expected: "unsigned integer",
    })
}

// Script libraries are inconsistent about booleans; some push true/false,
// others 0/1.
fn bool_field(callback: &str, payload: &[Value], index: usize) -> Result<bool, DecodeError> {
    let value = field(callback, payload, index)?;
    if let Some(flag) = value.as_bool() {
        return Ok(flag);
    }
    value
        .as_i64()
        .map(|raw| raw != 0)
        .ok_or_else(|| DecodeError::WrongType {
            callback: callback.to_string(),
            index,
            expected: "boolean",
        })
}

fn login_list(callback: &str, payload: &[Value], index: usize) -> Result<Vec<String>, DecodeError> {
    let entries = field(callback, payload, index)?
        .as_array()
        .ok_or_else(|| DecodeError::WrongType {
            callback: callback.to_string(),
            index,
            expected: "array",
        })?;
    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| DecodeError::WrongType {
                    callback: callback.to_string(),
                    index,
                    expected: "array of strings",
                })
        })
        .collect()
}

fn state_code_field(callback: &str, payload: &[Value], index: usize) -> Result<i32, DecodeError> {
    let raw = int_field(callback, payload, index)?;
    i32::try_from(raw).map_err(|_| DecodeError::WrongType {
        callback: callback.to_string(),
        index,
        expected: "state code",
    })
}

/// Decodes a raw callback payload into its typed event.
///
/// Returns `Ok(None)` when the callback name has no decoder; the dispatcher
/// treats that as "not supported" and never broadcasts it.
pub fn decode_callback(name: &str, payload: &[Value]) -> Result<Option<ScriptEvent>, DecodeError> {
    let event = match name {
        names::ON_SHOOT => ScriptEvent::Shoot(ShootEvent {
            shooter: str_field(name, payload, 0)?,
            weapon: Weapon::from_id(int_field(name, payload, 1)?),
        }),
        names::ON_HIT => ScriptEvent::Hit(weapon_contact(name, payload)?),
        names::ON_NEAR_MISS => ScriptEvent::NearMiss(weapon_contact(name, payload)?),
        names::ON_ARMOR_EMPTY => ScriptEvent::ArmorEmpty(weapon_contact(name, payload)?),
        names::ON_CAPTURE => ScriptEvent::Capture(CaptureEvent {
            landmark: str_field(name, payload, 0)?,
            players: login_list(name, payload, 1)?,
        }),
        names::TIME_ATTACK_ON_CHECKPOINT => ScriptEvent::Checkpoint(record(name, payload)?),
        names::TIME_ATTACK_ON_FINISH => ScriptEvent::Finish(record(name, payload)?),
        names::WARM_UP_STATUS => ScriptEvent::WarmUpStatus(WarmUpStatusEvent {
            active: bool_field(name, payload, 0)?,
        }),
        names::AFK_STATUS => ScriptEvent::AfkStatus(AfkStatusEvent {
            login: str_field(name, payload, 0)?,
        }),
        names::PLAYER_CHAT => ScriptEvent::PlayerChat(PlayerChatEvent {
            player_uid: int_field(name, payload, 0)?,
            login: str_field(name, payload, 1)?,
            text: str_field(name, payload, 2)?,
            is_command: bool_field(name, payload, 3)?,
        }),
        names::BILL_UPDATED => ScriptEvent::BillUpdated(BillUpdatedEvent {
            bill_id: BillId(uint_field(name, payload, 0)?),
            state_code: state_code_field(name, payload, 1)?,
            state_name: str_field(name, payload, 2)?,
            transaction_id: uint_field(name, payload, 3)?,
        }),
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn weapon_contact(name: &str, payload: &[Value]) -> Result<WeaponContactEvent, DecodeError> {
    Ok(WeaponContactEvent {
        shooter: str_field(name, payload, 0)?,
        victim: str_field(name, payload, 1)?,
        weapon: Weapon::from_id(int_field(name, payload, 2)?),
    })
}

fn record(name: &str, payload: &[Value]) -> Result<RecordEvent, DecodeError> {
    Ok(RecordEvent {
        login: str_field(name, payload, 0)?,
        time_ms: int_field(name, payload, 1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScriptCallback;
    use serde_json::json;

    #[test]
    fn decodes_shoot_payload() {
        let payload = vec![json!("steeffeen"), json!(1)];
        let event = decode_callback(names::ON_SHOOT, &payload)
            .expect("decode failed")
            .expect("no event");
        assert_eq!(
            event,
            ScriptEvent::Shoot(ShootEvent {
                shooter: "steeffeen".to_string(),
                weapon: Weapon::Laser,
            })
        );
    }

    #[test]
    fn hit_and_near_miss_share_a_shape() {
        let payload = vec![json!("alice"), json!("bob"), json!(2)];
        let hit = decode_callback(names::ON_HIT, &payload).unwrap().unwrap();
        let near_miss = decode_callback(names::ON_NEAR_MISS, &payload).unwrap().unwrap();
        assert_eq!(hit.callback_name(), names::ON_HIT);
        assert_eq!(near_miss.callback_name(), names::ON_NEAR_MISS);
        let contact = WeaponContactEvent::from_event(&hit).expect("no contact payload");
        assert_eq!(contact, WeaponContactEvent::from_event(&near_miss).unwrap());
        assert_eq!(contact.weapon, Weapon::Rocket);
    }

    #[test]
    fn decodes_bill_updated_payload() {
        let payload = vec![json!(17), json!(4), json!("Payed"), json!(4211)];
        let event = decode_callback(names::BILL_UPDATED, &payload).unwrap().unwrap();
        assert_eq!(
            event,
            ScriptEvent::BillUpdated(BillUpdatedEvent {
                bill_id: BillId(17),
                state_code: 4,
                state_name: "Payed".to_string(),
                transaction_id: 4211,
            })
        );
    }

    #[test]
    fn accepts_numeric_booleans() {
        let payload = vec![json!(1)];
        let event = decode_callback(names::WARM_UP_STATUS, &payload).unwrap().unwrap();
        assert_eq!(
            event,
            ScriptEvent::WarmUpStatus(WarmUpStatusEvent { active: true })
        );
    }

    #[test]
    fn unknown_weapon_ids_are_preserved() {
        assert_eq!(Weapon::from_id(9), Weapon::Other(9));
        assert_eq!(Weapon::Other(9).id(), 9);
        assert_eq!(Weapon::from_id(5), Weapon::Arrow);
    }

    #[test]
    fn unknown_name_yields_none() {
        let payload = vec![json!("whatever")];
        assert!(decode_callback("SomeCustomCallback", &payload)
            .unwrap()
            .is_none());
    }

    #[test]
    fn short_payload_is_reported_with_field_index() {
        let payload = vec![json!("alice")];
        let err = decode_callback(names::ON_SHOOT, &payload).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { index: 1, .. }));
    }

    #[test]
    fn wrong_field_type_is_reported() {
        let payload = vec![json!(42), json!(1)];
        let err = decode_callback(names::ON_SHOOT, &payload).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::WrongType {
                index: 0,
                expected: "string",
                ..
            }
        ));
    }
}
