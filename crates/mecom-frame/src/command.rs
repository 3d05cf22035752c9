use crate::constants::{CONTROL_DEVICE, CONTROL_HOST};
use crate::error::{FrameError, Result};
use crate::field::{CommandToken, Field, FieldKind};

/// Frame header: control marker, device address, sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// `#` for host frames, `!` for device frames.
    pub control: u8,
    /// Target (or answering) device address.
    pub address: u8,
    /// Per-session request counter.
    pub sequence: u16,
}

impl Header {
    /// Header of a host-to-device frame.
    pub fn host(address: u8, sequence: u16) -> Self {
        Self {
            control: CONTROL_HOST,
            address,
            sequence,
        }
    }

    /// Header of a device-to-host frame.
    pub fn device(address: u8, sequence: u16) -> Self {
        Self {
            control: CONTROL_DEVICE,
            address,
            sequence,
        }
    }

    /// Address and sequence as typed fields.
    pub fn fields(&self) -> [Field; 2] {
        [Field::U8(self.address), Field::U16(self.sequence)]
    }
}

/// A request payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `?VR`: read `parameter_id` of `instance`.
    ValueRead { parameter_id: u16, instance: u8 },
    /// `VS`: write `value` to `parameter_id` of `instance`.
    ValueSet {
        parameter_id: u16,
        instance: u8,
        value: f32,
    },
}

const VALUE_READ_SCHEMA: &[FieldKind] = &[FieldKind::U16, FieldKind::U8];
const VALUE_SET_SCHEMA: &[FieldKind] = &[FieldKind::U16, FieldKind::U8, FieldKind::F32];

impl Command {
    pub fn read(parameter_id: u16, instance: u8) -> Self {
        Self::ValueRead {
            parameter_id,
            instance,
        }
    }

    pub fn set(parameter_id: u16, instance: u8, value: f32) -> Self {
        Self::ValueSet {
            parameter_id,
            instance,
            value,
        }
    }

    pub fn token(&self) -> CommandToken {
        match self {
            Self::ValueRead { .. } => CommandToken::ValueRead,
            Self::ValueSet { .. } => CommandToken::ValueSet,
        }
    }

    pub fn parameter_id(&self) -> u16 {
        match *self {
            Self::ValueRead { parameter_id, .. } | Self::ValueSet { parameter_id, .. } => {
                parameter_id
            }
        }
    }

    pub fn instance(&self) -> u8 {
        match *self {
            Self::ValueRead { instance, .. } | Self::ValueSet { instance, .. } => instance,
        }
    }

    /// Payload as an ordered field sequence, token first.
    pub fn fields(&self) -> Vec<Field> {
        match *self {
            Self::ValueRead {
                parameter_id,
                instance,
            } => vec![
                Field::Token(CommandToken::ValueRead),
                Field::U16(parameter_id),
                Field::U8(instance),
            ],
            Self::ValueSet {
                parameter_id,
                instance,
                value,
            } => vec![
                Field::Token(CommandToken::ValueSet),
                Field::U16(parameter_id),
                Field::U8(instance),
                Field::F32(value),
            ],
        }
    }

    /// Field layout following `token`.
    pub fn schema(token: CommandToken) -> &'static [FieldKind] {
        match token {
            CommandToken::ValueRead => VALUE_READ_SCHEMA,
            CommandToken::ValueSet => VALUE_SET_SCHEMA,
        }
    }

    /// Rebuild a command from the fields that follow its token.
    pub fn from_fields(token: CommandToken, fields: &[Field]) -> Result<Self> {
        match (token, fields) {
            (CommandToken::ValueRead, [Field::U16(parameter_id), Field::U8(instance)]) => {
                Ok(Self::read(*parameter_id, *instance))
            }
            (
                CommandToken::ValueSet,
                [Field::U16(parameter_id), Field::U8(instance), Field::F32(value)],
            ) => Ok(Self::set(*parameter_id, *instance, *value)),
            _ => Err(FrameError::UnknownCommand(token.as_str().to_string())),
        }
    }
}
