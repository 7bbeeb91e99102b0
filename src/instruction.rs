/// The dance instruction alphabet.
///
/// Programs are ASCII strings. Five tokens are moves, a digit opens a loop
/// with that repeat count and `.` closes the innermost open loop.
pub const FORWARD: u8 = b'F';
pub const BACKWARD: u8 = b'B';
pub const TURN_LEFT: u8 = b'l';
pub const TURN_RIGHT: u8 = b'r';
pub const PAUSE: u8 = b'-';
pub const LOOP_END: u8 = b'.';

/// One semantic instruction, as handed to an agent per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Pause,
    /// The program is exhausted.
    Finished,
}

impl Instruction {
    /// The token that encodes this instruction. `Finished` has none.
    pub fn token(self) -> Option<u8> {
        match self {
            Instruction::Forward => Some(FORWARD),
            Instruction::Backward => Some(BACKWARD),
            Instruction::TurnLeft => Some(TURN_LEFT),
            Instruction::TurnRight => Some(TURN_RIGHT),
            Instruction::Pause => Some(PAUSE),
            Instruction::Finished => None,
        }
    }
}

/// A classified program byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Move(Instruction),
    LoopStart(u8),
    LoopEnd,
}

impl Token {
    /// Classify a byte, or `None` if it is outside the alphabet.
    pub fn from_byte(byte: u8) -> Option<Token> {
        match byte {
            FORWARD => Some(Token::Move(Instruction::Forward)),
            BACKWARD => Some(Token::Move(Instruction::Backward)),
            TURN_LEFT => Some(Token::Move(Instruction::TurnLeft)),
            TURN_RIGHT => Some(Token::Move(Instruction::TurnRight)),
            PAUSE => Some(Token::Move(Instruction::Pause)),
            LOOP_END => Some(Token::LoopEnd),
            b'0'..=b'9' => Some(Token::LoopStart(byte - b'0')),
            _ => None,
        }
    }
}

/// True for the five tokens that produce an instruction on their own.
pub fn is_move_token(byte: u8) -> bool {
    matches!(Token::from_byte(byte), Some(Token::Move(_)))
}
