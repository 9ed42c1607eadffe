//! Inbound commands — the client → server wire shape.
//!
//! Commands are internally tagged JSON:
//!
//! ```json
//! { "type": "ROLL_DICE", "roomId": "a1b2c3d4" }
//! ```
//!
//! Every command names the room it targets; the transport layer routes it
//! to that room's actor without interpreting anything else.

use serde::{Deserialize, Serialize};

use crate::RoomId;

/// A command sent by a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum ClientCommand {
    JoinRoom { room_id: RoomId },
    LeaveRoom { room_id: RoomId },
    RollDice { room_id: RoomId },
    Reroll { room_id: RoomId },
    UseAbility { room_id: RoomId },
}

impl ClientCommand {
    /// The room this command targets.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::JoinRoom { room_id }
            | Self::LeaveRoom { room_id }
            | Self::RollDice { room_id }
            | Self::Reroll { room_id }
            | Self::UseAbility { room_id } => room_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_dice_json_shape() {
        let cmd = ClientCommand::RollDice {
            room_id: RoomId::new("a1b2c3d4"),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "ROLL_DICE");
        assert_eq!(json["roomId"], "a1b2c3d4");
    }

    #[test]
    fn test_parses_from_wire_json() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"USE_ABILITY","roomId":"deadbeef"}"#).unwrap();
        assert_eq!(
            cmd,
            ClientCommand::UseAbility {
                room_id: RoomId::new("deadbeef")
            }
        );
        assert_eq!(cmd.room_id().as_str(), "deadbeef");
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let result: Result<ClientCommand, _> =
            serde_json::from_str(r#"{"type":"FIREBALL","roomId":"deadbeef"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_all_commands_round_trip() {
        let room_id = RoomId::new("a1b2c3d4");
        let commands = [
            ClientCommand::JoinRoom {
                room_id: room_id.clone(),
            },
            ClientCommand::LeaveRoom {
                room_id: room_id.clone(),
            },
            ClientCommand::RollDice {
                room_id: room_id.clone(),
            },
            ClientCommand::Reroll {
                room_id: room_id.clone(),
            },
            ClientCommand::UseAbility { room_id },
        ];
        for cmd in commands {
            let json = serde_json::to_string(&cmd).unwrap();
            let decoded: ClientCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(cmd, decoded);
        }
    }
}
