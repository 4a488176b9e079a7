//! External command channel: closed opcode/argument variants and parsing.

use std::str::FromStr;

use crate::error::CruiseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedArg {
    Up,
    Down,
    Set(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CruiseArg {
    On,
    Off,
    Go,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavCommand {
    Speed(SpeedArg),
    Cruise(CruiseArg),
    LaneChange(LaneSide),
    /// Debug annotation only
    Detect(String),
    /// Anything that failed to parse; consumed but has no effect.
    #[default]
    Unknown,
}

impl NavCommand {
    /// Parse an opcode/argument pair. Opcodes and keyword arguments are
    /// case-insensitive; `DETECT` keeps its argument verbatim.
    pub fn parse(opcode: &str, arg: &str) -> Result<Self, CruiseError> {
        let op = opcode.trim().to_ascii_uppercase();
        let arg = arg.trim();
        let upper = arg.to_ascii_uppercase();
        match op.as_str() {
            "SPEED" => match upper.as_str() {
                "UP" => Ok(Self::Speed(SpeedArg::Up)),
                "DOWN" => Ok(Self::Speed(SpeedArg::Down)),
                _ => arg
                    .parse::<i32>()
                    .map(|v| Self::Speed(SpeedArg::Set(v)))
                    .map_err(|_| CruiseError::InvalidArgument {
                        opcode: "SPEED",
                        arg: arg.to_string(),
                    }),
            },
            "CRUISE" => match upper.as_str() {
                "ON" => Ok(Self::Cruise(CruiseArg::On)),
                "OFF" => Ok(Self::Cruise(CruiseArg::Off)),
                "GO" => Ok(Self::Cruise(CruiseArg::Go)),
                "STOP" => Ok(Self::Cruise(CruiseArg::Stop)),
                _ => Err(CruiseError::InvalidArgument {
                    opcode: "CRUISE",
                    arg: arg.to_string(),
                }),
            },
            "LANECHANGE" => match upper.as_str() {
                "LEFT" => Ok(Self::LaneChange(LaneSide::Left)),
                "RIGHT" => Ok(Self::LaneChange(LaneSide::Right)),
                _ => Err(CruiseError::InvalidArgument {
                    opcode: "LANECHANGE",
                    arg: arg.to_string(),
                }),
            },
            "DETECT" => Ok(Self::Detect(arg.to_string())),
            _ => Err(CruiseError::UnknownOpcode(opcode.trim().to_string())),
        }
    }

    /// Parse, degrading any failure to `Unknown` so the command is a no-op.
    pub fn parse_lossy(opcode: &str, arg: &str) -> Self {
        Self::parse(opcode, arg).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "ignoring command");
            Self::Unknown
        })
    }
}

/// Accepts `"OPCODE ARG"` or `"OPCODE:ARG"`.
impl FromStr for NavCommand {
    type Err = CruiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (op, arg) = s
            .split_once([' ', ':'])
            .ok_or_else(|| CruiseError::MalformedCommand(s.to_string()))?;
        Self::parse(op, arg)
    }
}

/// A command with its message index. Each positive index is processed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    pub index: i64,
    pub command: NavCommand,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SPEED", "UP", NavCommand::Speed(SpeedArg::Up))]
    #[case("speed", "down", NavCommand::Speed(SpeedArg::Down))]
    #[case("SPEED", "80", NavCommand::Speed(SpeedArg::Set(80)))]
    #[case("CRUISE", "GO", NavCommand::Cruise(CruiseArg::Go))]
    #[case("CRUISE", "STOP", NavCommand::Cruise(CruiseArg::Stop))]
    #[case("LANECHANGE", "LEFT", NavCommand::LaneChange(LaneSide::Left))]
    #[case("DETECT", "Red Light", NavCommand::Detect("Red Light".into()))]
    fn parses_known_pairs(#[case] op: &str, #[case] arg: &str, #[case] want: NavCommand) {
        assert_eq!(NavCommand::parse(op, arg).unwrap(), want);
    }

    #[rstest]
    #[case("SPEED", "fast")]
    #[case("CRUISE", "MAYBE")]
    #[case("LANECHANGE", "UP")]
    #[case("HONK", "")]
    fn rejects_unknown(#[case] op: &str, #[case] arg: &str) {
        assert!(NavCommand::parse(op, arg).is_err());
        assert_eq!(NavCommand::parse_lossy(op, arg), NavCommand::Unknown);
    }

    #[test]
    fn from_str_splits_on_space_or_colon() {
        assert_eq!(
            "CRUISE:OFF".parse::<NavCommand>().unwrap(),
            NavCommand::Cruise(CruiseArg::Off)
        );
        assert_eq!(
            "SPEED 50".parse::<NavCommand>().unwrap(),
            NavCommand::Speed(SpeedArg::Set(50))
        );
        assert!(matches!(
            "SPEED".parse::<NavCommand>(),
            Err(CruiseError::MalformedCommand(_))
        ));
    }
}
